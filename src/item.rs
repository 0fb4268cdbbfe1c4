//! Cache items and expiration rules
//!
//! A `CacheItem` is the transient handle an application uses to read one
//! entry or to stage a write. Mutating an item never touches the pool it came
//! from; it has to be handed back through `save` or `save_deferred`.

use crate::error::CacheResult;
use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An entry is expired once its expiration time is reached
pub fn is_expired(expires: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires.is_some_and(|at| at <= now)
}

/// Absolute time `seconds` from now, saturating at the representable range
pub fn expiration_after(seconds: i64) -> DateTime<Utc> {
    let bound = if seconds < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    };
    Duration::try_seconds(seconds)
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .unwrap_or(bound)
}

/// Expiration applied when an item falls back to the default policy.
/// `0` means entries never expire.
pub fn default_expiration(seconds: i64) -> Option<DateTime<Utc>> {
    (seconds != 0).then(|| expiration_after(seconds))
}

/// Durable record stored in a pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload
    pub value: Value,

    /// When the entry expires, `None` = never
    pub expires: Option<DateTime<Utc>>,
}

impl CacheEntry {
    /// Create an entry
    pub fn new(value: Value, expires: Option<DateTime<Utc>>) -> Self {
        Self { value, expires }
    }

    /// Create an entry that never expires
    pub fn permanent(value: Value) -> Self {
        Self::new(value, None)
    }

    /// Check if the entry is expired
    pub fn is_expired(&self) -> bool {
        is_expired(self.expires, Utc::now())
    }
}

/// Expiration policy carried by an item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expiration {
    /// Follow the default of the pool the item is saved to
    PoolDefault,
    /// Resolved expiration, `None` = never
    Fixed(Option<DateTime<Utc>>),
}

impl Expiration {
    fn for_ttl(default_ttl: Option<i64>) -> Self {
        match default_ttl {
            Some(seconds) => Self::Fixed(default_expiration(seconds)),
            None => Self::PoolDefault,
        }
    }

    fn resolve(self, default_ttl: i64) -> Option<DateTime<Utc>> {
        match self {
            Self::PoolDefault => default_expiration(default_ttl),
            Self::Fixed(at) => at,
        }
    }
}

/// A single key/value/expiration triple handed out by a pool
#[derive(Debug, Clone, PartialEq)]
pub struct CacheItem {
    key: String,
    value: Option<Value>,
    expiration: Expiration,
    hit: bool,
    /// Default lifetime of the pool this item came from, `None` if unbound
    default_ttl: Option<i64>,
}

impl CacheItem {
    /// Create an item for a write. Until an expiration is set it follows the
    /// default of whichever pool it is saved to.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: None,
            expiration: Expiration::PoolDefault,
            hit: false,
            default_ttl: None,
        }
    }

    /// Item for an entry that was found in a pool
    pub(crate) fn found(key: String, entry: &CacheEntry, default_ttl: i64) -> Self {
        Self {
            key,
            value: Some(entry.value.clone()),
            expiration: Expiration::Fixed(entry.expires),
            hit: true,
            default_ttl: Some(default_ttl),
        }
    }

    /// Item for a lookup that missed
    pub(crate) fn missed(key: String, default_ttl: i64) -> Self {
        Self {
            key,
            value: None,
            expiration: Expiration::Fixed(default_expiration(default_ttl)),
            hit: false,
            default_ttl: Some(default_ttl),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The value of this item, `None` on a miss or once expired
    pub fn get(&self) -> Option<&Value> {
        if self.is_expired() {
            return None;
        }
        self.value.as_ref()
    }

    /// Deserialize the value into `T`
    pub fn get_as<T: DeserializeOwned>(&self) -> CacheResult<Option<T>> {
        self.get()
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(Into::into)
    }

    /// Whether the lookup hit. Re-checked against the clock on every call.
    pub fn is_hit(&self) -> bool {
        self.hit && !self.is_expired()
    }

    /// Replace the value
    pub fn set(&mut self, value: impl Into<Value>) -> &mut Self {
        self.value = Some(value.into());
        self
    }

    /// Replace the value with any serializable data
    pub fn try_set<T: Serialize + ?Sized>(&mut self, value: &T) -> CacheResult<&mut Self> {
        self.value = Some(serde_json::to_value(value)?);
        Ok(self)
    }

    /// Set an absolute expiration, `None` resets to the pool default
    pub fn expires_at(&mut self, expiration: Option<DateTime<Utc>>) -> &mut Self {
        self.expiration = match expiration {
            Some(at) => Expiration::Fixed(Some(at)),
            None => Expiration::for_ttl(self.default_ttl),
        };
        self
    }

    /// Set the expiration relative to now, `None` resets to the pool default
    pub fn expires_after(&mut self, duration: Option<Duration>) -> &mut Self {
        self.expiration = match duration {
            Some(delta) => Expiration::Fixed(Some(
                Utc::now()
                    .checked_add_signed(delta)
                    .unwrap_or(if delta < Duration::zero() {
                        DateTime::<Utc>::MIN_UTC
                    } else {
                        DateTime::<Utc>::MAX_UTC
                    }),
            )),
            None => Expiration::for_ttl(self.default_ttl),
        };
        self
    }

    /// Set the expiration to a raw number of seconds from now
    pub fn expires_after_secs(&mut self, seconds: i64) -> &mut Self {
        self.expiration = Expiration::Fixed(Some(expiration_after(seconds)));
        self
    }

    /// Make the item never expire, whatever the pool default
    pub fn never_expires(&mut self) -> &mut Self {
        self.expiration = Expiration::Fixed(None);
        self
    }

    /// The configured absolute expiration, `None` = never or not yet
    /// resolved, see [`CacheItem::follows_pool_default`]
    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        match self.expiration {
            Expiration::PoolDefault => None,
            Expiration::Fixed(at) => at,
        }
    }

    /// True while an unbound item waits for a pool to pick its expiration
    pub fn follows_pool_default(&self) -> bool {
        self.expiration == Expiration::PoolDefault
    }

    /// Attach the item to a pool, resolving a pending default expiration
    pub(crate) fn bind(&mut self, default_ttl: i64) {
        self.expiration = Expiration::Fixed(self.expiration.resolve(default_ttl));
        self.default_ttl = Some(default_ttl);
    }

    /// Turn the item into the durable entry a pool with `default_ttl` stores
    pub(crate) fn to_entry(&self, default_ttl: i64) -> CacheEntry {
        CacheEntry::new(
            self.value.clone().unwrap_or(Value::Null),
            self.expiration.resolve(default_ttl),
        )
    }

    pub(crate) fn is_expired(&self) -> bool {
        is_expired(self.expiration(), Utc::now())
    }
}
