//! Shared sync algorithms
//!
//! Every adapter gets the same resolve-or-create behavior: these functions
//! only talk to a provider through its `CrmProvider` primitives.

use fieldsync_domain::{
    AttachmentReport, CheckInData, CheckInSyncReport, CrmContactData, CrmError, CrmJobData,
    CrmResult, CustomerMatchStrategy, SyncSettings,
};
use tracing::{debug, info, warn};

use super::mapping::{contact_from_check_in, job_from_check_in};
use super::ports::{CrmProvider, CustomerLookup};

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Find an existing customer.
///
/// Tries the external id first, then each lookup allowed by `strategy`. The
/// first hit wins.
pub async fn find_customer<P>(
    provider: &P,
    contact: &CrmContactData,
    strategy: CustomerMatchStrategy,
) -> CrmResult<Option<String>>
where
    P: CrmProvider + ?Sized,
{
    if let Some(external_id) = non_blank(contact.external_id.as_deref()) {
        if let Some(found) = provider.get_customer(external_id).await? {
            debug!(provider = provider.provider_name(), customer_id = %found, "matched customer by id");
            return Ok(Some(found));
        }
        debug!(
            provider = provider.provider_name(),
            external_id, "stored customer id not found, falling back to search"
        );
    }

    for lookup in CustomerLookup::candidates(contact, strategy) {
        if let Some(found) = provider.search_customer(&lookup).await? {
            debug!(
                provider = provider.provider_name(),
                customer_id = %found,
                matched_on = lookup.field(),
                "matched existing customer"
            );
            return Ok(Some(found));
        }
    }

    Ok(None)
}

/// Resolve-or-create a customer, updating the full record when it exists.
pub async fn sync_customer<P>(provider: &P, contact: &CrmContactData) -> CrmResult<String>
where
    P: CrmProvider + ?Sized,
{
    match find_customer(provider, contact, CustomerMatchStrategy::All).await? {
        Some(id) => {
            provider.update_customer(&id, contact).await?;
            info!(provider = provider.provider_name(), customer_id = %id, "updated CRM customer");
            Ok(id)
        }
        None => {
            let id = provider.create_customer(contact).await?;
            info!(provider = provider.provider_name(), customer_id = %id, "created CRM customer");
            Ok(id)
        }
    }
}

/// Update a job by external id or create it.
///
/// Only a create triggers image attachment; the returned report is empty
/// otherwise.
pub async fn sync_job<P>(provider: &P, job: &CrmJobData) -> CrmResult<(String, AttachmentReport)>
where
    P: CrmProvider + ?Sized,
{
    if let Some(external_id) = non_blank(job.external_id.as_deref()) {
        if let Some(found) = provider.get_job(external_id).await? {
            provider.update_job(&found, job).await?;
            info!(provider = provider.provider_name(), job_id = %found, "updated CRM job");
            return Ok((found, AttachmentReport::default()));
        }
        debug!(provider = provider.provider_name(), external_id, "stored job id not found, creating");
    }

    let id = provider.create_job(job).await?;
    info!(provider = provider.provider_name(), job_id = %id, "created CRM job");

    let report = if job.images.is_empty() {
        AttachmentReport::default()
    } else {
        attach_images(provider, &id, &job.images).await
    };

    Ok((id, report))
}

/// Upload images one at a time in input order.
///
/// A failure is logged and the next image is attempted.
pub async fn attach_images<P>(provider: &P, job_id: &str, image_urls: &[String]) -> AttachmentReport
where
    P: CrmProvider + ?Sized,
{
    let mut report = AttachmentReport::default();

    for url in image_urls {
        match provider.upload_image(job_id, url).await {
            Ok(()) => report.attached.push(url.clone()),
            Err(err) => {
                warn!(
                    provider = provider.provider_name(),
                    job_id,
                    image_url = %url,
                    status = ?err.status(),
                    error = %err,
                    "failed to attach image to job"
                );
                report.failed.push(url.clone());
            }
        }
    }

    if !report.attached.is_empty() {
        info!(
            provider = provider.provider_name(),
            job_id,
            attached = report.attached.len(),
            failed = report.failed.len(),
            "attached images to job"
        );
    }

    report
}

/// Push one check-in: customer first, then the job.
///
/// Disabled steps are skipped. Any failure in an enabled step aborts the
/// remaining steps.
pub async fn sync_check_in<P>(
    provider: &P,
    check_in: &CheckInData,
    settings: &SyncSettings,
) -> CrmResult<CheckInSyncReport>
where
    P: CrmProvider + ?Sized,
{
    let contact = contact_from_check_in(check_in, settings);

    let customer_id = if settings.sync_customers {
        Some(resolve_check_in_customer(provider, &contact, settings).await?)
    } else {
        non_blank(check_in.customer_external_id.as_deref()).map(str::to_string)
    };

    let mut report = CheckInSyncReport { customer_id: customer_id.clone(), ..Default::default() };

    if settings.sync_check_ins_as_jobs {
        let customer_id = customer_id.ok_or_else(|| {
            CrmError::permanent(
                provider.provider_name(),
                "no CRM customer id available for job sync",
            )
        })?;

        let job = job_from_check_in(check_in, &customer_id, &contact.name, settings);
        let (job_id, attachments) = sync_job(provider, &job).await?;

        report.job_id = Some(job_id);
        report.images_attached = attachments.attached.len();
        report.images_failed = attachments.failed.len();
    }

    Ok(report)
}

async fn resolve_check_in_customer<P>(
    provider: &P,
    contact: &CrmContactData,
    settings: &SyncSettings,
) -> CrmResult<String>
where
    P: CrmProvider + ?Sized,
{
    match find_customer(provider, contact, settings.customer_match_strategy).await? {
        Some(id) if settings.update_existing_customers => {
            provider.update_customer(&id, contact).await?;
            info!(provider = provider.provider_name(), customer_id = %id, "updated CRM customer");
            Ok(id)
        }
        Some(id) => Ok(id),
        None if settings.create_new_customers => {
            let id = provider.create_customer(contact).await?;
            info!(provider = provider.provider_name(), customer_id = %id, "created CRM customer");
            Ok(id)
        }
        None => Err(CrmError::not_found(
            provider.provider_name(),
            "no matching customer and customer creation is disabled",
        )),
    }
}
