// File: greenlit-core/src/services/audit_service.rs

use std::sync::Arc;

use chrono::SecondsFormat;
use tracing::{info, warn};

use crate::Error;
use crate::platforms::GuildApi;
use crate::repositories::AuditLogRepository;
use crate::services::RequestContext;
use greenlit_common::models::{AuditAction, AuditEvent};

/// Appends audit events and mirrors them to the configured Discord channel.
pub struct AuditService {
    repo: Arc<dyn AuditLogRepository>,
    guild: Arc<dyn GuildApi>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditLogRepository>, guild: Arc<dyn GuildApi>) -> Self {
        Self { repo, guild }
    }

    /// Stores the event with the request's actor and clock, then posts
    /// `message` to the log channel if mirroring is on. Mirror failures are
    /// only logged.
    pub async fn record(
        &self,
        ctx: &RequestContext,
        action: AuditAction,
        target_id: Option<&str>,
        system: Option<&str>,
        message: &str,
    ) -> Result<AuditEvent, Error> {
        let event = self
            .repo
            .append(action, Some(&ctx.actor_id), target_id, system, ctx.now)
            .await?;
        info!("audit: {} actor={} target={:?} system={:?}", action, ctx.actor_id, target_id, system);

        if let Some(channel) = ctx.settings.mirror_channel() {
            let line = format!(
                "📝 [{}] {}",
                ctx.now.to_rfc3339_opts(SecondsFormat::Millis, true),
                message
            );
            if let Err(e) = self.guild.send_channel_message(channel, &line).await {
                warn!("Failed to mirror audit event to channel {}: {}", channel, e);
            }
        }
        Ok(event)
    }

    /// Newest first; `limit` is clamped to 1..=50.
    pub async fn recent(&self, limit: i64) -> Result<Vec<AuditEvent>, Error> {
        self.repo.recent(limit.clamp(1, 50)).await
    }
}
