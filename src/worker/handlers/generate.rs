use tracing::{info, warn};

use crate::{
    common::error::LedgerError,
    domain::{account::Credits, ledger::Ledger, session::Session},
    generation::{GenerationError, GenerationRequest, ImageGenerator, ImagePayload, TierLimits},
    worker::handlers::{deduct, grant},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub images: Vec<ImagePayload>,
    pub charged: Credits,
}

#[derive(thiserror::Error, Debug)]
pub enum GenerateError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: Credits, available: Credits },
    #[error("{source}")]
    Generation {
        #[source]
        source: GenerationError,
        /// Credits given back after the failed call.
        refunded: Credits,
    },
}

/// Charge the signed-in account for `request` at its tier's price, then call
/// the provider once. A failed call is refunded when
/// `generation.refund_on_failure` is set.
pub fn handle(
    ledger: &mut Ledger,
    session: &mut Session,
    generator: &dyn ImageGenerator,
    request: &GenerationRequest,
) -> Result<GenerationOutcome, GenerateError> {
    if request.prompt.trim().is_empty() {
        return Err(LedgerError::validation("Please enter a prompt.").into());
    }

    let account = ledger.own_account(session)?;
    let limits = TierLimits::for_tier(account.tier);
    limits.check(request)?;

    let Some(api_key) = ledger.api_key().map(str::to_owned) else {
        return Err(GenerateError::Generation {
            source: GenerationError::NotConfigured,
            refunded: 0,
        });
    };

    let cost = limits.cost(request.count);
    if !deduct::handle(ledger, session, cost)? {
        return Err(GenerateError::InsufficientCredits {
            required: cost,
            available: account.credits,
        });
    }

    let result = generator
        .generate(&api_key, request)
        .and_then(|images| {
            if images.is_empty() {
                Err(GenerationError::Failed("the provider returned no images".to_string()))
            } else {
                Ok(images)
            }
        });

    match result {
        Ok(images) => {
            info!(account = %account.id, count = images.len(), charged = cost, "images generated");
            Ok(GenerationOutcome {
                images,
                charged: cost,
            })
        }
        Err(source) => {
            let refunded = if ledger.config().generation.refund_on_failure {
                grant::handle(ledger, session, cost)?;
                cost
            } else {
                0
            };
            warn!(account = %account.id, error = %source, refunded, "image generation failed");
            Err(GenerateError::Generation { source, refunded })
        }
    }
}
