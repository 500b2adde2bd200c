use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};

/// TRS-80 model codes as reported in `context.model`.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
pub enum ModelType {
    #[strum(to_string = "Undefined")]
    Undefined = 0,
    #[strum(to_string = "Model I")]
    ModelI = 1,
    #[strum(to_string = "Model II")]
    ModelII = 2,
    #[strum(to_string = "Model III")]
    ModelIII = 3,
    #[strum(to_string = "Model 4")]
    ModelIV = 4,
    #[strum(to_string = "Model 4P")]
    ModelIVP = 5,
}

/// Identity of the system under test.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SystemContext {
    pub system_name: String,
    pub model: u8,
}

impl SystemContext {
    /// `None` for codes outside the known model list.
    pub fn model_type(&self) -> Option<ModelType> {
        ModelType::from_repr(self.model)
    }
}
