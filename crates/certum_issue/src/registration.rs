//! Organization registration, a prerequisite for NFT issuance.

use crate::classifier::ErrorClassifier;
use crate::error::RegistrationError;
use certum_core::{Address, TxHash};
use certum_ledger::{LedgerWriter, RegistrationRequest, StorageClient};
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

static BRAND_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("brand colour pattern compiles"));

/// Whether `color` is `#RRGGBB`
#[must_use]
pub fn is_brand_color(color: &str) -> bool {
    BRAND_COLOR.is_match(color)
}

/// Result of a successful registration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationReceipt {
    /// Registration transaction
    pub transaction_hash: TxHash,
    /// Gateway URL of the uploaded logo
    pub logo_url: String,
}

/// Registers an issuing organization with its branding
pub struct OrganizationRegistrar<L: LedgerWriter + ?Sized, S: StorageClient + ?Sized> {
    ledger: Arc<L>,
    storage: Arc<S>,
    classifier: ErrorClassifier,
}

impl<L, S> OrganizationRegistrar<L, S>
where
    L: LedgerWriter + ?Sized,
    S: StorageClient + ?Sized,
{
    /// Create a registrar
    #[must_use]
    pub fn new(ledger: Arc<L>, storage: Arc<S>) -> Self {
        Self {
            ledger,
            storage,
            classifier: ErrorClassifier::new(),
        }
    }

    /// Upload the logo, then register `name` for `owner`
    ///
    /// # Errors
    ///
    /// Returns error if an input is invalid, or if the upload or the
    /// ledger call fails
    pub async fn register_organization(
        &self,
        owner: Address,
        name: &str,
        logo: Vec<u8>,
        brand_color: &str,
    ) -> Result<RegistrationReceipt, RegistrationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistrationError::MissingName);
        }
        if logo.is_empty() {
            return Err(RegistrationError::MissingLogo);
        }
        let brand_color = brand_color.trim();
        if !is_brand_color(brand_color) {
            return Err(RegistrationError::InvalidColor(brand_color.to_string()));
        }

        let logo_hash = self
            .storage
            .upload_file(logo)
            .await
            .map_err(|err| RegistrationError::Failed(self.classifier.classify_error(&err)))?;
        let logo_url = self.storage.gateway_url(&logo_hash);

        let request = RegistrationRequest {
            owner,
            name: name.to_string(),
            logo_url: logo_url.clone(),
            brand_color: brand_color.to_string(),
        };
        let transaction_hash = self
            .ledger
            .register_organization(request)
            .await
            .map_err(|err| RegistrationError::Failed(self.classifier.classify_error(&err)))?;

        tracing::info!(%owner, name, tx = %transaction_hash, "organization registered");
        Ok(RegistrationReceipt {
            transaction_hash,
            logo_url,
        })
    }
}
