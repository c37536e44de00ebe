//! Resilient client
//!
//! Wraps one [`Session`] behind a single lock. Reads of the controller
//! configuration and the pool status are cached for [`ClientConfig::cache_ttl`];
//! every gateway call is retried after a reconnect when it fails with a
//! transient error, up to [`ClientConfig::reconnect_retries`] times.

use std::ops::RangeInclusive;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use tracing::{instrument, trace, warn};

use crate::config::ClientConfig;
use crate::equipment::{
    BodyType, ControllerConfig, HeatMode, HeatingState, PoolStatus, TemperatureUnit,
};
use crate::protocol::messages::HistoryData;
use crate::protocol::metrics::Metrics;
use crate::protocol::{Error, Result};
use crate::transport::Gateway;

/// The gateway operations the client needs.
///
/// [`Gateway`] is the real implementation; tests substitute scripted sessions.
pub trait Session {
    /// Raw gateway display name
    fn name(&self) -> &str;
    /// Drop the connection and run the handshake again
    fn reconnect(&mut self) -> Result<()>;
    /// Firmware version string
    fn version(&mut self) -> Result<String>;
    /// Fetch the controller configuration
    fn controller_config(&mut self) -> Result<ControllerConfig>;
    /// Fetch the pool/spa status
    fn pool_status(&mut self) -> Result<PoolStatus>;
    /// Set the heat set-point of `body`, in the controller's unit
    fn set_heat_point(&mut self, body: BodyType, temperature: u32) -> Result<()>;
    /// Set the heat mode of `body`
    fn set_heat_mode(&mut self, body: BodyType, mode: HeatMode) -> Result<()>;
    /// Temperature history between `start` and `end`
    fn history(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> Result<HistoryData>;
}

impl Session for Gateway {
    fn name(&self) -> &str {
        Self::name(self)
    }

    fn reconnect(&mut self) -> Result<()> {
        Self::reconnect(self)
    }

    fn version(&mut self) -> Result<String> {
        Self::version(self)
    }

    fn controller_config(&mut self) -> Result<ControllerConfig> {
        Self::controller_config(self)
    }

    fn pool_status(&mut self) -> Result<PoolStatus> {
        Self::pool_status(self)
    }

    fn set_heat_point(&mut self, body: BodyType, temperature: u32) -> Result<()> {
        Self::set_heat_point(self, body, temperature)
    }

    fn set_heat_mode(&mut self, body: BodyType, mode: HeatMode) -> Result<()> {
        Self::set_heat_mode(self, body, mode)
    }

    fn history(&mut self, start: NaiveDateTime, end: NaiveDateTime) -> Result<HistoryData> {
        Self::history(self, start, end)
    }
}

#[derive(Debug)]
struct CacheEntry<T> {
    value: Arc<T>,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn fresh(&self, now: Instant) -> Option<Arc<T>> {
        (now < self.expires_at).then(|| Arc::clone(&self.value))
    }
}

#[derive(Debug)]
struct Inner<S> {
    session: S,
    config: Option<CacheEntry<ControllerConfig>>,
    status: Option<CacheEntry<PoolStatus>>,
}

/// Thread-safe gateway client with caching and reconnect-and-retry.
#[derive(Debug)]
pub struct Client<S = Gateway> {
    inner: Mutex<Inner<S>>,
    name: String,
    cache_ttl: Duration,
    retries: u32,
}

impl Client<Gateway> {
    /// Discover the gateway, connect, log in and wrap the session
    pub fn connect(config: ClientConfig) -> Result<Self> {
        let cache_ttl = config.cache_ttl;
        let retries = config.reconnect_retries;
        let gateway = Gateway::open(config)?;
        Ok(Self::with_options(gateway, cache_ttl, retries))
    }
}

impl<S: Session> Client<S> {
    /// Wrap an authenticated session using the cache and retry options in `config`
    pub fn new(session: S, config: &ClientConfig) -> Self {
        Self::with_options(session, config.cache_ttl, config.reconnect_retries)
    }

    /// Wrap an authenticated session
    pub fn with_options(session: S, cache_ttl: Duration, retries: u32) -> Self {
        let name = session.name().to_string();
        Self {
            inner: Mutex::new(Inner {
                session,
                config: None,
                status: None,
            }),
            name,
            cache_ttl,
            retries,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        // a panic mid-request leaves nothing half-written in the cache
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Raw gateway display name, unmodified
    #[must_use]
    pub fn gateway_name(&self) -> &str {
        &self.name
    }

    /// Firmware version string. Never cached.
    #[instrument(level = "debug", skip(self))]
    pub fn gateway_version(&self) -> Result<String> {
        let mut inner = self.lock();
        self.retrying(&mut inner.session, "version", S::version)
    }

    /// Controller configuration, from cache while fresh
    #[instrument(level = "debug", skip(self))]
    pub fn controller_config(&self) -> Result<Arc<ControllerConfig>> {
        let mut inner = self.lock();
        let now = Instant::now();
        if let Some(hit) = inner.config.as_ref().and_then(|e| e.fresh(now)) {
            trace!("controller config cache hit");
            Metrics::record_cache(true);
            return Ok(hit);
        }
        trace!("controller config cache miss");
        Metrics::record_cache(false);

        let value = Arc::new(self.retrying(
            &mut inner.session,
            "controller_config",
            S::controller_config,
        )?);
        inner.config = Some(CacheEntry {
            value: Arc::clone(&value),
            expires_at: Instant::now() + self.cache_ttl,
        });
        Ok(value)
    }

    /// Pool/spa status, from cache while fresh
    #[instrument(level = "debug", skip(self))]
    pub fn pool_status(&self) -> Result<Arc<PoolStatus>> {
        let mut inner = self.lock();
        let now = Instant::now();
        if let Some(hit) = inner.status.as_ref().and_then(|e| e.fresh(now)) {
            trace!("pool status cache hit");
            Metrics::record_cache(true);
            return Ok(hit);
        }
        trace!("pool status cache miss");
        Metrics::record_cache(false);

        let value = Arc::new(self.retrying(&mut inner.session, "pool_status", S::pool_status)?);
        inner.status = Some(CacheEntry {
            value: Arc::clone(&value),
            expires_at: Instant::now() + self.cache_ttl,
        });
        Ok(value)
    }

    /// Unit the controller is configured for
    pub fn temperature_unit(&self) -> Result<TemperatureUnit> {
        Ok(self.controller_config()?.temperature_unit())
    }

    /// Outside air temperature in `unit`
    pub fn air_temperature(&self, unit: TemperatureUnit) -> Result<i32> {
        let status = self.pool_status()?;
        convert(self.temperature_unit()?, status.air_temperature(), unit)
    }

    /// Current water temperature of `body` in `unit`
    pub fn current_temperature(&self, body: BodyType, unit: TemperatureUnit) -> Result<i32> {
        let status = self.pool_status()?;
        let reading = status.require_body(body)?.current_temperature;
        convert(self.temperature_unit()?, reading, unit)
    }

    /// Whether the heater of `body` is switched on
    pub fn heater_active(&self, body: BodyType) -> Result<bool> {
        Ok(self.target_heat_mode(body)? == HeatMode::On)
    }

    /// Whether the heater of `body` is running right now
    pub fn heating_state(&self, body: BodyType) -> Result<HeatingState> {
        let status = self.pool_status()?;
        Ok(status.require_body(body)?.heating_state())
    }

    /// Heat mode currently selected for `body`
    pub fn target_heat_mode(&self, body: BodyType) -> Result<HeatMode> {
        let status = self.pool_status()?;
        status.require_body(body)?.heat_mode()
    }

    /// Heat set-point of `body` in `unit`
    pub fn heating_threshold(&self, body: BodyType, unit: TemperatureUnit) -> Result<i32> {
        let status = self.pool_status()?;
        let raw = status.require_body(body)?.heat_set_point;
        let set_point = i32::try_from(raw)
            .map_err(|_| Error::malformed(format!("heat set-point {raw} out of range")))?;
        convert(self.temperature_unit()?, set_point, unit)
    }

    /// Allowed heat set-points of `body` in `unit`
    pub fn set_point_range(
        &self,
        body: BodyType,
        unit: TemperatureUnit,
    ) -> Result<RangeInclusive<i32>> {
        let config = self.controller_config()?;
        let controller = config.temperature_unit();
        let range = config.set_point_range(body);
        let min = convert(controller, i32::from(range.min), unit)?;
        let max = convert(controller, i32::from(range.max), unit)?;
        Ok(min..=max)
    }

    /// Set the heat set-point of `body` from a value in `unit`
    pub fn set_heating_threshold(
        &self,
        body: BodyType,
        value: i32,
        unit: TemperatureUnit,
    ) -> Result<()> {
        let converted = convert(unit, value, self.temperature_unit()?)?;
        let temperature = u32::try_from(converted)
            .map_err(|_| Error::malformed(format!("set-point {converted} below zero")))?;
        self.set_temperature(body, temperature)
    }

    /// Set the heat set-point of `body`, in the controller's unit
    #[instrument(level = "debug", skip(self))]
    pub fn set_temperature(&self, body: BodyType, temperature: u32) -> Result<()> {
        let mut inner = self.lock();
        let result = self.retrying(&mut inner.session, "set_heat_point", |s| {
            s.set_heat_point(body, temperature)
        });
        inner.status = None;
        result
    }

    /// Set the heat mode of `body`
    #[instrument(level = "debug", skip(self))]
    pub fn set_heat_mode(&self, body: BodyType, mode: HeatMode) -> Result<()> {
        let mut inner = self.lock();
        let result = self.retrying(&mut inner.session, "set_heat_mode", |s| {
            s.set_heat_mode(body, mode)
        });
        inner.status = None;
        result
    }

    /// Temperature history between `start` and `end`. Never cached.
    #[instrument(level = "debug", skip(self))]
    pub fn history(&self, start: NaiveDateTime, end: NaiveDateTime) -> Result<HistoryData> {
        let mut inner = self.lock();
        self.retrying(&mut inner.session, "history", |s| s.history(start, end))
    }

    /// Drop both cache entries
    pub fn invalidate_cache(&self) {
        let mut inner = self.lock();
        inner.config = None;
        inner.status = None;
    }

    /// Attempt, classify, then reconnect and retry while the budget lasts.
    fn retrying<T>(
        &self,
        session: &mut S,
        operation: &'static str,
        mut attempt: impl FnMut(&mut S) -> Result<T>,
    ) -> Result<T> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            let err = match attempt(session) {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() => err,
                Err(err) => {
                    Metrics::record_error();
                    return Err(err);
                }
            };

            if attempts > self.retries {
                Metrics::record_error();
                return Err(Error::RetriesExhausted {
                    attempts,
                    source: Box::new(err),
                });
            }

            warn!(
                operation,
                attempt = attempts,
                error = %err,
                "reconnecting after transient failure"
            );
            Metrics::record_reconnect();
            if let Err(reconnect) = session.reconnect() {
                Metrics::record_error();
                return Err(Error::ReconnectFailed(Box::new(reconnect)));
            }
        }
    }
}

fn convert(from: TemperatureUnit, value: i32, to: TemperatureUnit) -> Result<i32> {
    from.convert(value, to).ok_or_else(|| {
        Error::malformed(format!(
            "temperature {value}{} out of range in {}",
            from.symbol(),
            to.symbol()
        ))
    })
}
