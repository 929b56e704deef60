use std::collections::HashMap;

use reqwest::Method;
use serde::Deserialize;
use serde_json::value::RawValue;
use serde_json::{Map, Value};

use crate::kv::{mounts, KvVersion, Secret};
use crate::session::Session;
use crate::Error;

#[derive(Deserialize)]
struct SecretMetadata {
    #[serde(default)]
    version: u64,
}

/// The `data` of a kv v2 read, the values sit one level deeper
#[derive(Deserialize)]
struct SecretV2Data {
    data: Box<RawValue>,
    #[serde(default)]
    metadata: Option<SecretMetadata>,
}

/// Loads the secret at the given path, detecting the kv version of its mount
/// first.
///
/// [Vault-Documentation](https://www.vaultproject.io/api-docs/secret/kv/kv-v2#read-secret-version)
pub(crate) async fn get(session: &Session, path: &str) -> Result<Secret, Error> {
    let resolution = mounts::resolve(session, path).await?;
    let secret_path = resolution.secret_path(path);

    let response = session
        .request::<()>(Method::GET, &secret_path, None)
        .await?;
    let data = response.data.as_deref().ok_or_else(|| {
        Error::decode(
            secret_path.as_str(),
            serde::de::Error::custom("response has no `data` field"),
        )
    })?;

    decode(resolution.version, data, &secret_path)
}

/// Turns the `data` of a kv response into a Secret.
///
/// As long as every value is a string the secret is a flat key-value map. The
/// first value that is neither a string nor null turns the whole secret into
/// one json document instead. Null values are left out of the map
pub(crate) fn decode(version: KvVersion, data: &RawValue, context: &str) -> Result<Secret, Error> {
    let document = match version {
        KvVersion::V2 => {
            let secret: SecretV2Data =
                serde_json::from_str(data.get()).map_err(|e| Error::decode(context, e))?;
            if let Some(metadata) = &secret.metadata {
                log::debug!("read version {} of '{}'", metadata.version, context);
            }
            secret.data
        }
        KvVersion::V1 => data.to_owned(),
    };

    let fields: Map<String, Value> =
        serde_json::from_str(document.get()).map_err(|e| Error::decode(context, e))?;

    let mut kv = HashMap::with_capacity(fields.len());
    for (key, value) in fields {
        match value {
            Value::String(s) => {
                kv.insert(key, s);
            }
            Value::Null => {}
            _ => return Ok(Secret::Json(document)),
        }
    }

    Ok(Secret::Kv(kv))
}
