/// A user-facing notice, rendered as an embed by the chat adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<NoticeField>,
    /// Local image shown as the embed thumbnail.
    pub thumbnail: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl Notice {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: Vec::new(),
            thumbnail: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(NoticeField {
            name: name.into(),
            value: value.into(),
            inline,
        });
        self
    }

    pub fn with_thumbnail(mut self, path: &'static str) -> Self {
        self.thumbnail = Some(path);
        self
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&NoticeField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
