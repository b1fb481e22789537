use crate::{
    cache::{get_json, set_json, CacheBackend},
    db::with_transaction,
    entities::site_setting::{self, Entity as SiteSetting, SettingType},
    errors::ServiceError,
    events::{Event, EventSender},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QuerySelect, Set,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

const CACHE_KEY: &str = "site_settings";

/// key -> typed value
pub type SettingsMap = BTreeMap<String, Value>;

fn group_cache_key(group: &str) -> String {
    format!("{}:{}", CACHE_KEY, group)
}

/// Stored string form of a setting value. Strings are kept verbatim, booleans
/// become "1"/"0", structured values are JSON encoded.
pub fn stored_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// One entry of the built-in settings catalogue.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSetting {
    pub key: &'static str,
    pub group: &'static str,
    pub setting_type: SettingType,
    pub label: &'static str,
    pub value: Option<&'static str>,
    pub validation_rules: Option<&'static [&'static str]>,
}

const fn text(
    key: &'static str,
    group: &'static str,
    label: &'static str,
    value: Option<&'static str>,
) -> DefaultSetting {
    DefaultSetting {
        key,
        group,
        setting_type: SettingType::Text,
        label,
        value,
        validation_rules: None,
    }
}

const fn number(
    key: &'static str,
    group: &'static str,
    label: &'static str,
    value: &'static str,
) -> DefaultSetting {
    DefaultSetting {
        key,
        group,
        setting_type: SettingType::Number,
        label,
        value: Some(value),
        validation_rules: None,
    }
}

/// Settings a fresh store starts with.
pub fn default_settings() -> Vec<DefaultSetting> {
    vec![
        text("site_name", "general", "Site Name", Some("My E-commerce Store")),
        text(
            "site_description",
            "general",
            "Site Description",
            Some("Welcome to our online store"),
        ),
        DefaultSetting {
            validation_rules: Some(&["email"]),
            ..text("contact_email", "contact", "Contact Email", None)
        },
        text("contact_phone", "contact", "Contact Phone", None),
        text("social_facebook", "social", "Facebook URL", None),
        text("social_instagram", "social", "Instagram URL", None),
        text(
            "meta_title_template",
            "seo",
            "Meta Title Template",
            Some("{page_title} | {site_name}"),
        ),
        text("meta_description", "seo", "Default Meta Description", None),
        text("currency_code", "store", "Currency Code", Some("USD")),
        text("currency_symbol", "store", "Currency Symbol", Some("$")),
        number("tax_rate", "store", "Default Tax Rate (%)", "0"),
        number(
            "featured_products_count",
            "homepage",
            "Number of Featured Products",
            "8",
        ),
        number(
            "new_arrivals_count",
            "homepage",
            "Number of New Arrivals",
            "8",
        ),
    ]
}

/// Site settings behind a read-through cache.
///
/// Reads are cached per group and for the full set; every write drops all of
/// those entries.
#[derive(Clone)]
pub struct SiteSettingsService {
    db: Arc<DatabaseConnection>,
    cache: Arc<dyn CacheBackend>,
    ttl: Duration,
    event_sender: Arc<EventSender>,
}

impl SiteSettingsService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        cache: Arc<dyn CacheBackend>,
        ttl: Duration,
        event_sender: Arc<EventSender>,
    ) -> Self {
        Self {
            db,
            cache,
            ttl,
            event_sender,
        }
    }

    /// Every setting as a typed value, keyed (and ordered) by setting key
    #[instrument(skip(self))]
    pub async fn all(&self) -> Result<SettingsMap, ServiceError> {
        if let Some(hit) = get_json::<SettingsMap>(self.cache.as_ref(), CACHE_KEY).await? {
            debug!("site settings cache hit");
            return Ok(hit);
        }

        let rows = SiteSetting::find()
            .all(&*self.db)
            .await?;
        let settings: SettingsMap = rows.iter().map(|s| (s.key.clone(), s.typed_value())).collect();

        set_json(self.cache.as_ref(), CACHE_KEY, &settings, Some(self.ttl)).await?;
        Ok(settings)
    }

    #[instrument(skip(self))]
    pub async fn group(&self, group: &str) -> Result<SettingsMap, ServiceError> {
        let key = group_cache_key(group);
        if let Some(hit) = get_json::<SettingsMap>(self.cache.as_ref(), &key).await? {
            debug!(group, "site settings group cache hit");
            return Ok(hit);
        }

        let rows = SiteSetting::find()
            .filter(site_setting::Column::Group.eq(group))
            .all(&*self.db)
            .await?;
        let settings: SettingsMap = rows.iter().map(|s| (s.key.clone(), s.typed_value())).collect();

        set_json(self.cache.as_ref(), &key, &settings, Some(self.ttl)).await?;
        Ok(settings)
    }

    /// A single typed value, or `default` when the key is unknown or unset
    pub async fn get(&self, key: &str, default: Value) -> Result<Value, ServiceError> {
        let settings = self.all().await?;
        Ok(match settings.get(key) {
            Some(Value::Null) | None => default,
            Some(value) => value.clone(),
        })
    }

    /// Updates one setting. Returns `false` when no setting has that key.
    #[instrument(skip(self, value))]
    pub async fn set(&self, key: &str, value: Value) -> Result<bool, ServiceError> {
        let updated = update_value(&*self.db, key, &value).await?;
        if !updated {
            return Ok(false);
        }

        self.clear_cache().await?;
        self.event_sender
            .send_or_log(Event::SiteSettingsUpdated {
                keys: vec![key.to_string()],
            })
            .await;
        Ok(true)
    }

    /// Updates every known key in one transaction; unknown keys are skipped.
    /// Returns the keys that were updated.
    #[instrument(skip(self, values), fields(count = values.len()))]
    pub async fn update_many(
        &self,
        values: BTreeMap<String, Value>,
    ) -> Result<Vec<String>, ServiceError> {
        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let mut updated = Vec::new();
                for (key, value) in &values {
                    if update_value(txn, key, value).await? {
                        updated.push(key.clone());
                    }
                }
                Ok::<_, ServiceError>(updated)
            })
        })
        .await?;

        self.clear_cache().await?;
        if !updated.is_empty() {
            self.event_sender
                .send_or_log(Event::SiteSettingsUpdated {
                    keys: updated.clone(),
                })
                .await;
        }
        Ok(updated)
    }

    /// Drops the full-set entry and one entry per stored group.
    #[instrument(skip(self))]
    pub async fn clear_cache(&self) -> Result<(), ServiceError> {
        self.cache.delete(CACHE_KEY).await?;

        let groups: Vec<String> = SiteSetting::find()
            .select_only()
            .column(site_setting::Column::Group)
            .distinct()
            .into_tuple()
            .all(&*self.db)
            .await?;
        for group in &groups {
            self.cache.delete(&group_cache_key(group)).await?;
        }

        debug!(groups = groups.len(), "site settings cache cleared");
        self.event_sender
            .send_or_log(Event::SiteSettingsCacheCleared)
            .await;
        Ok(())
    }

    /// Inserts any default setting whose key is missing. Returns how many
    /// were inserted.
    #[instrument(skip(self))]
    pub async fn seed_defaults(&self) -> Result<usize, ServiceError> {
        let existing: Vec<String> = SiteSetting::find()
            .select_only()
            .column(site_setting::Column::Key)
            .into_tuple()
            .all(&*self.db)
            .await?;

        let mut inserted = 0;
        for (position, default) in default_settings().into_iter().enumerate() {
            if existing.iter().any(|k| k == default.key) {
                continue;
            }

            let validation_rules = default
                .validation_rules
                .map(|rules| serde_json::to_value(rules))
                .transpose()?;

            site_setting::ActiveModel {
                id: Set(Uuid::new_v4()),
                key: Set(default.key.to_string()),
                group: Set(default.group.to_string()),
                value: Set(default.value.map(str::to_string)),
                setting_type: Set(default.setting_type),
                label: Set(default.label.to_string()),
                description: Set(None),
                is_public: Set(true),
                validation_rules: Set(validation_rules),
                sort_order: Set(position as i32),
            }
            .insert(&*self.db)
            .await?;
            inserted += 1;
        }

        if inserted > 0 {
            info!(inserted, "Seeded default site settings");
            self.clear_cache().await?;
        }
        Ok(inserted)
    }
}

async fn update_value<C: ConnectionTrait>(
    conn: &C,
    key: &str,
    value: &Value,
) -> Result<bool, ServiceError> {
    let Some(setting) = SiteSetting::find()
        .filter(site_setting::Column::Key.eq(key))
        .one(conn)
        .await?
    else {
        return Ok(false);
    };

    let mut active: site_setting::ActiveModel = setting.into();
    active.value = Set(stored_value(value));
    active.update(conn).await?;
    Ok(true)
}
