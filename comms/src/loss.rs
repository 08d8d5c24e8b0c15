use serde::{Deserialize, Serialize};

/// The exact payload size of a loss reply.
pub const LOSS_SIZE: usize = size_of::<f64>();

/// Byte order used for the loss reply payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossByteOrder {
    /// Big-endian, same as the length prefix.
    #[default]
    Network,
    /// Host order, interoperates with peers that copy the raw double.
    Native,
}

/// A scalar training loss exchanged after every adversarial round.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Loss(pub f64);

impl Loss {
    /// Serializes the loss into its 8 byte payload.
    pub fn to_bytes(self, order: LossByteOrder) -> [u8; LOSS_SIZE] {
        match order {
            LossByteOrder::Network => self.0.to_be_bytes(),
            LossByteOrder::Native => self.0.to_ne_bytes(),
        }
    }

    /// Deserializes a loss payload.
    ///
    /// # Returns
    /// `None` if `bytes` is not exactly `LOSS_SIZE` long.
    pub fn from_bytes(bytes: &[u8], order: LossByteOrder) -> Option<Self> {
        let raw: [u8; LOSS_SIZE] = bytes.try_into().ok()?;

        let value = match order {
            LossByteOrder::Network => f64::from_be_bytes(raw),
            LossByteOrder::Native => f64::from_ne_bytes(raw),
        };

        Some(Self(value))
    }
}
