/// Capabilities / limits of a transport implementation.
#[derive(Clone, Copy, Debug)]
pub struct TransportCapabilities {
    pub supports_inline_keyboards: bool,
    /// Hard per-message limit in bytes.
    pub max_message_len: usize,
}

/// Inline keyboard (buttons), one button per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub buttons: Vec<InlineButton>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineKeyboard {
    pub fn new(buttons: Vec<InlineButton>) -> Self {
        Self { buttons }
    }

    /// Build a keyboard from `(label, payload)` pairs.
    pub fn from_pairs<L, D>(pairs: impl IntoIterator<Item = (L, D)>) -> Self
    where
        L: Into<String>,
        D: Into<String>,
    {
        Self {
            buttons: pairs
                .into_iter()
                .map(|(label, data)| InlineButton {
                    label: label.into(),
                    callback_data: data.into(),
                })
                .collect(),
        }
    }
}
