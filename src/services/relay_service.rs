use std::time::Duration;

use reqwest::Client;
use sqlx::PgPool;

use crate::error::Result;
use crate::models::webhook_log::WebhookLog;

const BASE_RETRY_SECS: u64 = 30;
const MAX_RETRY_SECS: u64 = 3600;

/// Delay before the next attempt once `attempts` deliveries have failed.
pub fn retry_delay(attempts: i32) -> Duration {
    let exponent = attempts.saturating_sub(1).clamp(0, 16) as u32;
    Duration::from_secs((BASE_RETRY_SECS << exponent).min(MAX_RETRY_SECS))
}

#[derive(Debug, PartialEq, Eq)]
struct Delivery {
    http_status: Option<i32>,
    body: String,
}

impl Delivery {
    fn succeeded(&self) -> bool {
        matches!(self.http_status, Some(code) if (200..300).contains(&code))
    }
}

/// Pushes queued notifications to the configured relay endpoint.
#[derive(Clone)]
pub struct RelayService {
    pool: PgPool,
    client: Client,
    secret: String,
}

impl RelayService {
    pub fn new(pool: PgPool, secret: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            pool,
            client,
            secret,
        }
    }

    /// Delivers at most one due row. Returns false when nothing was due.
    pub async fn run_once(&self) -> Result<bool> {
        sqlx::query(
            r#"UPDATE webhook_logs SET status = 'pending', updated_at = NOW()
               WHERE status = 'delivering' AND updated_at < NOW() - INTERVAL '5 minutes'"#,
        )
        .execute(&self.pool)
        .await?;

        let claimed = sqlx::query_as::<_, WebhookLog>(
            r#"
            UPDATE webhook_logs SET status = 'delivering', updated_at = NOW()
            WHERE id = (
                SELECT id FROM webhook_logs
                WHERE status = 'pending' AND (next_retry_at IS NULL OR next_retry_at <= NOW())
                ORDER BY created_at ASC
                FOR UPDATE SKIP LOCKED
                LIMIT 1
            )
            RETURNING id, event_type, payload, target_url, http_status, response_body,
                      attempts, max_attempts, next_retry_at, status, created_at, updated_at
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        let Some(log) = claimed else { return Ok(false) };

        let delivery = self.deliver(&log).await;
        let attempts = log.attempts + 1;
        let status = if delivery.succeeded() {
            "success"
        } else if attempts >= log.max_attempts {
            "failed"
        } else {
            "pending"
        };
        let next_retry_secs = (status == "pending").then(|| retry_delay(attempts).as_secs_f64());

        sqlx::query(
            r#"
            UPDATE webhook_logs
            SET http_status = $1, response_body = $2, status = $3, attempts = $4,
                next_retry_at = CASE WHEN $5::float8 IS NULL THEN NULL
                                     ELSE NOW() + $5::float8 * INTERVAL '1 second' END,
                updated_at = NOW()
            WHERE id = $6
            "#,
        )
        .bind(delivery.http_status)
        .bind(&delivery.body)
        .bind(status)
        .bind(attempts)
        .bind(next_retry_secs)
        .bind(log.id)
        .execute(&self.pool)
        .await?;

        if status == "failed" {
            tracing::warn!(log = %log.id, attempts, "notification relay gave up");
        } else {
            tracing::debug!(log = %log.id, status, attempts, "notification relay attempt recorded");
        }
        Ok(true)
    }

    async fn deliver(&self, log: &WebhookLog) -> Delivery {
        let res = self
            .client
            .post(&log.target_url)
            .header("X-Webhook-Secret", &self.secret)
            .header("X-Webhook-Event", &log.event_type)
            .json(&log.payload)
            .send()
            .await;
        match res {
            Ok(resp) => {
                let status = resp.status().as_u16() as i32;
                let body = resp.text().await.unwrap_or_default();
                Delivery {
                    http_status: Some(status),
                    body,
                }
            }
            Err(err) => Delivery {
                http_status: None,
                body: err.to_string(),
            },
        }
    }
}
