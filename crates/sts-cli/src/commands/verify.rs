//! Request signature verification.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sts_core::StsConfig;
use sts_ws::{FaultMapper, SoapFault};
use sts_xmldsig::{Signature, SignatureValidator};
use tracing::debug;

use crate::cli::VerifyArgs;
use crate::config::OutputFormat;
use crate::output::{error, output_single, success};
use crate::{CliConfig, CliError, CliResult};

/// What `verify` reports about an accepted signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignerReport {
    /// Signer certificate subject.
    pub subject: String,
    /// Signer certificate issuer.
    pub issuer: String,
    /// Where the certificate was found.
    pub location: String,
    /// Certificate validity start.
    pub not_before: DateTime<Utc>,
    /// Certificate validity end.
    pub not_after: DateTime<Utc>,
    /// Whether the certificate is currently valid.
    pub currently_valid: bool,
}

impl SignerReport {
    fn new(signature: &Signature, now: DateTime<Utc>) -> Self {
        let certificate = signature.certificate();
        Self {
            subject: certificate.subject_dn().to_string(),
            issuer: certificate.issuer_dn().to_string(),
            location: signature.location().to_string(),
            not_before: certificate.not_before(),
            not_after: certificate.not_after(),
            currently_valid: certificate.is_valid_at(now),
        }
    }
}

#[derive(Serialize)]
struct FaultReport<'a> {
    faultcode: String,
    faultstring: &'a str,
}

/// Runs `verify`.
pub async fn run_verify(
    args: VerifyArgs,
    config: &CliConfig,
    format: OutputFormat,
) -> CliResult<()> {
    let xml = tokio::fs::read_to_string(&args.envelope).await?;
    let mut settings = config.sts.clone();
    if let Some(allow) = args.allow_sha1 {
        settings.allow_sha1 = allow;
    }
    debug!(
        envelope = %args.envelope.display(),
        allow_sha1 = settings.allow_sha1,
        "verifying request signature"
    );

    match verify_envelope(&xml, &settings, Utc::now()) {
        Ok(report) => {
            if matches!(format, OutputFormat::Table) {
                success("Signature is valid");
            }
            output_single(&report, format)
        }
        Err(fault) => {
            let code = fault.code().prefixed_name();
            match format {
                OutputFormat::Table => {
                    error(fault.description());
                    let xml = fault.to_xml().map_err(sts_xmldsig::XmlError::from)?;
                    println!("{xml}");
                }
                OutputFormat::Json => output_single(
                    &FaultReport {
                        faultcode: code.clone(),
                        faultstring: fault.description(),
                    },
                    format,
                )?,
                OutputFormat::Quiet => {}
            }
            Err(CliError::Rejected(code))
        }
    }
}

/// Validates the signature of a SOAP envelope and describes the signer, or
/// returns the fault the service would answer with.
pub fn verify_envelope(
    xml: &str,
    settings: &StsConfig,
    now: DateTime<Utc>,
) -> Result<SignerReport, SoapFault> {
    let validator = SignatureValidator::from_config(settings);
    match validator.validate_envelope(xml) {
        Ok(signature) => Ok(SignerReport::new(&signature, now)),
        Err(fault) => Err(FaultMapper::default().map_fault(&fault)),
    }
}
