use serde::de::{DeserializeOwned, Error as _};
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::Error;

/// The generic response envelope vault wraps every response in.
///
/// `data` and `auth` are kept as raw json, their shape depends on the endpoint
/// that was called, so only the caller can decode them into the right type
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    /// The id vault assigned to the request
    #[serde(default)]
    pub request_id: String,
    /// The id of the lease attached to the response, if any
    #[serde(default)]
    pub lease_id: String,
    /// Whether the lease can be renewed
    #[serde(default)]
    pub renewable: bool,
    /// The duration of the lease in seconds
    #[serde(default)]
    pub lease_duration: u64,
    /// The endpoint specific payload
    #[serde(default)]
    pub data: Option<Box<RawValue>>,
    /// Response wrapping information
    #[serde(default)]
    pub wrap_info: Option<Box<RawValue>>,
    /// Warnings vault attached to the response
    #[serde(default)]
    pub warnings: Option<Vec<String>>,
    /// The auth payload of login and renew responses
    #[serde(default)]
    pub auth: Option<Box<RawValue>>,
}

impl Envelope {
    /// Parses the envelope from a raw response body. An empty body is an
    /// empty envelope
    pub fn from_slice(body: &[u8], context: &str) -> Result<Envelope, Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Envelope::default());
        }

        serde_json::from_slice(body).map_err(|e| Error::decode(context, e))
    }

    /// Decodes the `data` payload into the given type
    pub fn decode_data<T: DeserializeOwned>(&self, context: &str) -> Result<T, Error> {
        decode_field(self.data.as_deref(), "data", context)
    }

    /// Decodes the `auth` payload into the given type
    pub fn decode_auth<T: DeserializeOwned>(&self, context: &str) -> Result<T, Error> {
        decode_field(self.auth.as_deref(), "auth", context)
    }

    /// The raw bytes of the `data` payload, empty if there was none
    pub fn data_bytes(&self) -> Vec<u8> {
        self.data
            .as_ref()
            .map(|raw| raw.get().as_bytes().to_vec())
            .unwrap_or_default()
    }
}

fn decode_field<T: DeserializeOwned>(
    raw: Option<&RawValue>,
    field: &str,
    context: &str,
) -> Result<T, Error> {
    let raw = raw.ok_or_else(|| {
        Error::decode(
            context,
            serde_json::Error::custom(format!("response has no `{}` field", field)),
        )
    })?;

    serde_json::from_str(raw.get()).map_err(|e| Error::decode(context, e))
}
