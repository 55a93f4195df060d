//! Source verification on Etherscan compatible block explorers

use std::time::Duration;

use alloy::{hex, primitives::Address};
use reqwest::Client;
use tracing::{debug, info};

use crate::{build::Artifact, constants::VERIFY_POLL_INTERVAL, errors::ScriptError};

/// Answer of the explorer while a submission is still being processed
const PENDING_RESULT: &str = "Pending in queue";

/// Answer of the explorer once a submission succeeded
const VERIFIED_RESULT: &str = "Pass - Verified";

/// A client of the explorer's `contract` API module
pub struct EtherscanVerifier {
    http: Client,
    api_url: String,
    api_key: String,
    poll_interval: Duration,
}

/// The envelope every explorer answer comes in
#[derive(Debug, PartialEq, Eq)]
struct ExplorerResponse {
    ok: bool,
    message: String,
    result: String,
}

/// Where a submitted verification stands
#[derive(Debug, PartialEq, Eq)]
enum VerificationStatus {
    Pending,
    Verified,
}

impl EtherscanVerifier {
    pub fn new(api_url: &str, api_key: &str) -> Self {
        Self {
            http: Client::new(),
            api_url: api_url.to_string(),
            api_key: api_key.to_string(),
            poll_interval: VERIFY_POLL_INTERVAL,
        }
    }

    /// Change the delay between two status checks
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Submit the artifact's source for `address`, then wait for the explorer's verdict
    pub async fn verify(
        &self,
        address: Address,
        artifact: &Artifact,
        constructor_args: &[u8],
    ) -> Result<(), ScriptError> {
        let guid = self.submit(address, artifact, constructor_args).await?;
        info!("Submitted source for verification, guid: {}", guid);

        loop {
            tokio::time::sleep(self.poll_interval).await;
            match self.check_status(&guid).await? {
                VerificationStatus::Pending => debug!("Verification {} still pending", guid),
                VerificationStatus::Verified => return Ok(()),
            }
        }
    }

    /// Send the `verifysourcecode` request, returning the submission guid
    async fn submit(
        &self,
        address: Address,
        artifact: &Artifact,
        constructor_args: &[u8],
    ) -> Result<String, ScriptError> {
        let params = [
            ("apikey", self.api_key.clone()),
            ("module", "contract".to_string()),
            ("action", "verifysourcecode".to_string()),
            ("contractaddress", address.to_string()),
            ("sourceCode", artifact.source.clone()),
            ("codeformat", "solidity-single-file".to_string()),
            ("contractname", artifact.contract_name.clone()),
            ("compilerversion", artifact.compiler_version.clone()),
            ("optimizationUsed", "0".to_string()),
            ("runs", "200".to_string()),
            // The misspelling is part of the explorer API
            ("constructorArguements", hex::encode(constructor_args)),
        ];

        let body = self
            .http
            .post(&self.api_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        let response = parse_response(&body)?;
        if !response.ok {
            return Err(ScriptError::Verification(response.result));
        }
        Ok(response.result)
    }

    /// Ask the explorer how a submission is going
    async fn check_status(&self, guid: &str) -> Result<VerificationStatus, ScriptError> {
        let body = self
            .http
            .get(&self.api_url)
            .query(&[
                ("apikey", self.api_key.as_str()),
                ("module", "contract"),
                ("action", "checkverifystatus"),
                ("guid", guid),
            ])
            .send()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?
            .text()
            .await
            .map_err(|e| ScriptError::Verification(e.to_string()))?;

        status_from_response(parse_response(&body)?)
    }
}

/// Whether a verification error only means the contract was verified before
pub fn is_already_verified(err: &ScriptError) -> bool {
    err.to_string().to_lowercase().contains("already verified")
}

/// Parse the `{status, message, result}` envelope
fn parse_response(body: &str) -> Result<ExplorerResponse, ScriptError> {
    let parsed = json::parse(body)
        .map_err(|e| ScriptError::Verification(format!("unexpected explorer answer: {e}")))?;

    let result = match &parsed["result"] {
        result if result.is_string() => result.as_str().unwrap_or_default().to_string(),
        result => result.dump(),
    };

    Ok(ExplorerResponse {
        ok: parsed["status"].as_str() == Some("1"),
        message: parsed["message"].as_str().unwrap_or_default().to_string(),
        result,
    })
}

/// Map a `checkverifystatus` answer onto a status, anything final but a pass is an error
fn status_from_response(response: ExplorerResponse) -> Result<VerificationStatus, ScriptError> {
    if response.result == PENDING_RESULT {
        Ok(VerificationStatus::Pending)
    } else if response.ok && response.result == VERIFIED_RESULT {
        Ok(VerificationStatus::Verified)
    } else if response.result.is_empty() {
        Err(ScriptError::Verification(response.message))
    } else {
        Err(ScriptError::Verification(response.result))
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Bytes;
    use wiremock::{
        matchers::{body_string_contains, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;

    fn artifact() -> Artifact {
        Artifact {
            contract_name: "SimpleStorage".to_string(),
            source_name: "contracts/SimpleStorage.sol".to_string(),
            source: "contract SimpleStorage {}".to_string(),
            abi: "[]".to_string(),
            bytecode: Bytes::from(vec![0x60, 0x80]),
            compiler_version: "v0.8.8+commit.dddeac2f".to_string(),
        }
    }

    fn verifier(server: &MockServer) -> EtherscanVerifier {
        EtherscanVerifier::new(&format!("{}/api", server.uri()), "explorer-key")
            .with_poll_interval(Duration::from_millis(10))
    }

    fn respond(status: &str, message: &str, result: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(format!(
            r#"{{"status":"{status}","message":"{message}","result":"{result}"}}"#
        ))
    }

    async fn mount_submission(server: &MockServer, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path("/api"))
            .and(body_string_contains("action=verifysourcecode"))
            .and(body_string_contains("compilerversion=v0.8.8%2Bcommit.dddeac2f"))
            .respond_with(response)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn polls_until_verified() {
        let server = MockServer::start().await;
        mount_submission(&server, respond("1", "OK", "guid-123")).await;

        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "checkverifystatus"))
            .and(query_param("guid", "guid-123"))
            .respond_with(respond("0", "NOTOK", "Pending in queue"))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "checkverifystatus"))
            .respond_with(respond("1", "OK", "Pass - Verified"))
            .expect(1)
            .mount(&server)
            .await;

        verifier(&server)
            .verify(Address::ZERO, &artifact(), &[])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn already_verified_submission_is_recognisable() {
        let server = MockServer::start().await;
        mount_submission(
            &server,
            respond("0", "NOTOK", "Contract source code already verified"),
        )
        .await;

        let err = verifier(&server)
            .verify(Address::ZERO, &artifact(), &[])
            .await
            .unwrap_err();

        assert!(is_already_verified(&err));
    }

    #[tokio::test]
    async fn failed_verification_carries_explorer_reason() {
        let server = MockServer::start().await;
        mount_submission(&server, respond("1", "OK", "guid-456")).await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(respond("0", "NOTOK", "Fail - Unable to verify"))
            .mount(&server)
            .await;

        let err = verifier(&server)
            .verify(Address::ZERO, &artifact(), &[])
            .await
            .unwrap_err();

        assert!(!is_already_verified(&err));
        assert!(err.to_string().contains("Fail - Unable to verify"));
    }

    #[test]
    fn already_verified_match_ignores_case() {
        assert!(is_already_verified(&ScriptError::Verification(
            "Already Verified".to_string()
        )));
        assert!(!is_already_verified(&ScriptError::Verification(
            "Invalid API Key".to_string()
        )));
    }

    #[test]
    fn non_json_answer_is_an_error() {
        assert!(parse_response("<html>rate limited</html>").is_err());
    }

    #[test]
    fn empty_result_falls_back_to_message() {
        let response = ExplorerResponse {
            ok: false,
            message: "Invalid API Key".to_string(),
            result: String::new(),
        };
        let err = status_from_response(response).unwrap_err();
        assert!(err.to_string().contains("Invalid API Key"));
    }
}
