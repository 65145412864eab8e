use reqwest::{Client, Response};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;

/// Token amount in the smallest unit, kept as decimal digits.
///
/// The server sends a JSON integer, or a decimal string for values beyond
/// `u128`. Both decode without loss.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Amount(String);

impl Amount {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The value as `u128`, when it fits.
    pub fn to_u128(&self) -> Option<u128> {
        self.0.parse().ok()
    }
}

impl std::fmt::Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_u128() {
            Some(v) => serializer.serialize_u128(v),
            None => serializer.serialize_str(&self.0),
        }
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Raw text, so integers past u64 are not routed through f64
        let raw = Box::<RawValue>::deserialize(deserializer)?;
        let text = raw.get();
        let digits = text
            .strip_prefix('"')
            .and_then(|t| t.strip_suffix('"'))
            .unwrap_or(text);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(D::Error::custom(format!("invalid amount: {}", text)));
        }
        Ok(Amount(digits.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    pub name: String,
    pub address: String,
    pub private_key: String,
    pub faucet_tx_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub name: String,
    pub address: String,
    pub token: String,
    pub token_address: String,
    pub balance: Amount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferResponse {
    pub success: bool,
    pub tx_hash: String,
    pub from_address: String,
    pub to_address: String,
    pub amount: Amount,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundResponse {
    pub success: bool,
    pub tx_hash: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub chain: String,
    pub block_number: Option<u64>,
}

// Serialized directly so amounts beyond i64 survive
#[derive(Serialize)]
struct TransferBody<'a> {
    from_name: &'a str,
    to_name: &'a str,
    amount: i128,
    token: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
    error_code: String,
    #[serde(default)]
    tx_hash: Option<String>,
}

/// Errors returned by [`BankClient`].
#[derive(Debug)]
pub enum ClientError {
    /// Connection or protocol failure.
    Http(reqwest::Error),
    /// The server answered with an error body.
    Api {
        status: u16,
        error_code: String,
        detail: String,
        /// Present when the transaction was broadcast before the failure.
        tx_hash: Option<String>,
    },
    /// The server answered with something other than the expected JSON.
    Decode(String),
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Http(e) => write!(f, "HTTP error: {}", e),
            ClientError::Api {
                status,
                error_code,
                detail,
                tx_hash,
            } => {
                write!(f, "{} ({}): {}", status, error_code, detail)?;
                if let Some(tx_hash) = tx_hash {
                    write!(f, " [tx {}]", tx_hash)?;
                }
                Ok(())
            }
            ClientError::Decode(e) => write!(f, "Unexpected response: {}", e),
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Http(e)
    }
}

pub struct BankClient {
    client: Client,
    base_url: String,
}

impl BankClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Create a named account. The private key in the response is shown once.
    pub async fn create_account(&self, name: &str) -> Result<CreateAccountResponse, ClientError> {
        let resp = self
            .client
            .post(format!("{}/create_account", self.base_url))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn get_balance(&self, name: &str, token: &str) -> Result<BalanceResponse, ClientError> {
        let resp = self
            .client
            .get(format!("{}/get_balance", self.base_url))
            .query(&[("name", name), ("token", token)])
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn transfer(
        &self,
        from_name: &str,
        to_name: &str,
        amount: i128,
        token: &str,
    ) -> Result<TransferResponse, ClientError> {
        let resp = self
            .client
            .post(format!("{}/transfer", self.base_url))
            .json(&TransferBody {
                from_name,
                to_name,
                amount,
                token,
            })
            .send()
            .await?;
        decode(resp).await
    }

    /// Ask the faucet to fund a named account.
    pub async fn get_initial_fund(&self, name: &str) -> Result<FundResponse, ClientError> {
        let resp = self
            .client
            .post(format!("{}/get_initial_fund", self.base_url))
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await?;
        decode(resp).await
    }

    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let resp = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, ClientError> {
    let status = resp.status();
    let text = resp.text().await?;

    if !status.is_success() {
        return Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => ClientError::Api {
                status: status.as_u16(),
                error_code: body.error_code,
                detail: body.detail,
                tx_hash: body.tx_hash,
            },
            Err(_) => ClientError::Api {
                status: status.as_u16(),
                error_code: "unknown".to_string(),
                detail: text,
                tx_hash: None,
            },
        });
    }

    serde_json::from_str(&text).map_err(|e| ClientError::Decode(format!("{}: {}", e, text)))
}
