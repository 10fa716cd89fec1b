use crate::model::FileRef;

pub const BLOCKED_ACTION_MESSAGE: &str = "Clear the selected link or the custom link field first";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Affordance {
    Reference,
    CustomUrl,
    File,
}

impl Affordance {
    pub const ALL: [Affordance; 3] = [Affordance::Reference, Affordance::CustomUrl, Affordance::File];
}

/// Which affordances are disabled, and which one holds the item's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockingState {
    pub reference_disabled: bool,
    pub custom_url_disabled: bool,
    pub file_disabled: bool,
    pub authoritative: Option<Affordance>,
}

impl BlockingState {
    pub fn is_disabled(&self, affordance: Affordance) -> bool {
        match affordance {
            Affordance::Reference => self.reference_disabled,
            Affordance::CustomUrl => self.custom_url_disabled,
            Affordance::File => self.file_disabled,
        }
    }

    pub fn all_enabled(&self) -> bool {
        self.authoritative.is_none()
    }

    /// Tooltip explaining why `affordance` is disabled.
    pub fn disabled_hint(&self, affordance: Affordance) -> Option<&'static str> {
        if !self.is_disabled(affordance) {
            return None;
        }
        let hint = match (self.authoritative?, affordance) {
            (Affordance::Reference, Affordance::CustomUrl) => {
                "Clear the selected link to use this field"
            }
            (Affordance::Reference, _) => "Clear the selected link to attach a file",
            (Affordance::CustomUrl, Affordance::File) => "Clear the custom link to attach a file",
            (Affordance::CustomUrl, _) => "Clear the custom link to choose a link",
            (Affordance::File, Affordance::CustomUrl) => {
                "Remove the attached file to use this field"
            }
            (Affordance::File, _) => "Remove the attached file to choose a link",
        };
        Some(hint)
    }
}

/// Current values of an item's three affordances.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinkValues<'a> {
    pub reference: Option<&'a str>,
    pub custom_url: Option<&'a str>,
    pub file: Option<&'a FileRef>,
    pub uploading: bool,
}

/// Filled affordance wins; when several are filled (hydrated from bad
/// data) the order is reference, custom URL, file.
pub fn compute_blocking_state(values: &LinkValues<'_>) -> BlockingState {
    let filled = |value: Option<&str>| value.is_some_and(|v| !v.trim().is_empty());

    let authoritative = if filled(values.reference) {
        Some(Affordance::Reference)
    } else if filled(values.custom_url) {
        Some(Affordance::CustomUrl)
    } else if values.file.is_some() || values.uploading {
        Some(Affordance::File)
    } else {
        None
    };

    match authoritative {
        None => BlockingState::default(),
        Some(active) => BlockingState {
            reference_disabled: active != Affordance::Reference,
            custom_url_disabled: active != Affordance::CustomUrl,
            file_disabled: active != Affordance::File,
            authoritative: Some(active),
        },
    }
}
