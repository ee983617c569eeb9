//! # Attestation Service Client
//!
//! Delegates the authorisation decision to an external HTTP service. The
//! node POSTs `{tsk, sender, receiver, amount}` where `tsk` is the
//! transaction's signature token; a `200 OK` means authorised, anything
//! else (including a transport failure or timeout) means not.

use crate::domain::errors::SignatureError;
use crate::ports::inbound::TransactionAuthenticator;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use shared_types::Transaction;
use std::time::Duration;

#[derive(Debug, Serialize)]
struct AttestationRequest<'a> {
    tsk: &'a str,
    sender: &'a str,
    receiver: &'a str,
    amount: f64,
}

/// HTTP client for the attestation service.
#[derive(Debug, Clone)]
pub struct AttestationClient {
    client: Client,
    url: String,
}

impl AttestationClient {
    /// Client for `url`; every request is bounded by `timeout`.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SignatureError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|e| SignatureError::Attestation(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Ask the service about one transaction.
    pub async fn attest(&self, transaction: &Transaction) -> Result<(), SignatureError> {
        if !transaction.is_signed() {
            return Err(SignatureError::MissingSignature);
        }
        let body = AttestationRequest {
            tsk: &transaction.signature,
            sender: &transaction.from_address,
            receiver: &transaction.to_address,
            amount: transaction.amount,
        };
        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SignatureError::Attestation(e.to_string()))?;

        match response.status() {
            StatusCode::OK => Ok(()),
            status => Err(SignatureError::Attestation(format!(
                "service answered {status}"
            ))),
        }
    }
}

#[async_trait]
impl TransactionAuthenticator for AttestationClient {
    async fn authenticate(&self, transaction: &Transaction, _public_key: &str) -> bool {
        match self.attest(transaction).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(url = %self.url, from = %transaction.from_address, error = %e, "Attestation refused");
                false
            }
        }
    }
}
