use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use gridcat_core::{CharacteristicId, DomainError, Entity};

/// Maximum length of a characteristic code, in characters.
pub const CODE_MAX_LEN: usize = 5;

pub const CODE_REQUIRED: &str = "Code is required field.";
pub const CODE_TOO_LONG: &str = "Code must be at most 5 characters";

/// Kind of metering characteristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CharacteristicType {
    ConsumptionType,
    ChargingPoint,
    ConnectionPointStatus,
}

impl CharacteristicType {
    pub const ALL: [CharacteristicType; 3] = [
        CharacteristicType::ConsumptionType,
        CharacteristicType::ChargingPoint,
        CharacteristicType::ConnectionPointStatus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CharacteristicType::ConsumptionType => "CONSUMPTION_TYPE",
            CharacteristicType::ChargingPoint => "CHARGING_POINT",
            CharacteristicType::ConnectionPointStatus => "CONNECTION_POINT_STATUS",
        }
    }
}

impl core::fmt::Display for CharacteristicType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacteristicType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DomainError::validation(format!("unknown characteristic type '{s}'")))
    }
}

/// A metering characteristic attached to one or more resources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Characteristic {
    pub id: Option<CharacteristicId>,
    #[serde(deserialize_with = "null_as_blank")]
    pub code: String,
    pub characteristic_type: Option<CharacteristicType>,
    pub characteristic_value: Option<String>,
}

/// `"code": null` reads as a blank code so validation reports it.
fn null_as_blank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Characteristic {
    pub fn new(
        code: impl Into<String>,
        characteristic_type: CharacteristicType,
        characteristic_value: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            code: code.into(),
            characteristic_type: Some(characteristic_type),
            characteristic_value: Some(characteristic_value.into()),
        }
    }

    /// Rule violations for this characteristic; empty when valid.
    ///
    /// A blank code that is also too long reports both violations.
    pub fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();
        if self.code.trim().is_empty() {
            out.push(CODE_REQUIRED.to_string());
        }
        if self.code.chars().count() > CODE_MAX_LEN {
            out.push(CODE_TOO_LONG.to_string());
        }
        out
    }
}

impl Entity for Characteristic {
    type Id = CharacteristicId;

    fn id(&self) -> Option<Self::Id> {
        self.id
    }

    fn assign_id(&mut self, id: Self::Id) {
        self.id = Some(id);
    }
}
