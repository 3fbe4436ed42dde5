use crate::datasources::wunderground::{HourlyForecast, SunEvent, WeatherPayload};
use crate::error::{Result, RunGearError};
use crate::models::{ConditionCategory, WeatherSnapshot};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Which instant a snapshot should describe: current conditions, or one of
/// the provider's hourly forecast entries identified by its epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetInstant {
    Now,
    At(i64),
}

/// Normalize a provider payload into a [`WeatherSnapshot`] for the target
/// instant.
///
/// A forecast target must match an hourly entry exactly (epoch-seconds
/// equality). Daytime spans `[sunrise, sunset)`: the sunrise instant counts
/// as day, the sunset instant as night. Sunrise and sunset arrive in the
/// location's local clock; they are shifted into the caller's clock by the
/// whole-hour difference between the two UTC offsets before comparing.
pub fn snapshot_at(
    payload: &WeatherPayload,
    target: TargetInstant,
    caller_offset: FixedOffset,
    now: DateTime<Utc>,
) -> Result<WeatherSnapshot> {
    let obs = payload
        .current_observation
        .as_ref()
        .ok_or_else(|| RunGearError::MalformedPayload("missing current observation".to_string()))?;
    let sun = payload
        .sun_phase
        .as_ref()
        .ok_or_else(|| RunGearError::MalformedPayload("missing sun phase".to_string()))?;

    let t_utc = match target {
        TargetInstant::Now => now,
        TargetInstant::At(epoch) => DateTime::from_timestamp(epoch, 0).ok_or_else(|| {
            RunGearError::MalformedPayload(format!("invalid target time {}", epoch))
        })?,
    };

    let location_offset_hours = parse_tz_offset(&obs.local_tz_offset)?;
    let caller_offset_hours = (caller_offset.local_minus_utc() / 3600) as i64;
    let shift_hours = caller_offset_hours - location_offset_hours;

    let local = t_utc.with_timezone(&caller_offset).naive_local();
    let date = local.date();
    let sunrise = sun_instant(date, &sun.sunrise, shift_hours)?;
    let sunset = sun_instant(date, &sun.sunset, shift_hours)?;
    let is_daytime = sunrise <= local && local < sunset;

    let snapshot = match target {
        TargetInstant::Now => WeatherSnapshot {
            city: obs.display_location.city.clone(),
            time: obs.observation_time.clone(),
            temp_f: obs.temp_f,
            feels_like_f: parse_numeric("feelslike_f", &obs.feelslike_f)?,
            condition: ConditionCategory::from_icon(&obs.icon),
            wind_mph: obs.wind_mph,
            is_daytime,
        },
        TargetInstant::At(epoch) => {
            let hourly = payload.hourly_forecast.as_ref().ok_or_else(|| {
                RunGearError::MalformedPayload("missing hourly forecast".to_string())
            })?;
            let entry = find_forecast(hourly, epoch)?;
            WeatherSnapshot {
                city: obs.display_location.city.clone(),
                time: entry.fcttime.pretty.clone(),
                temp_f: parse_numeric("temp", &entry.temp.english)?,
                feels_like_f: parse_numeric("feelslike", &entry.feelslike.english)?,
                condition: ConditionCategory::from_icon(&entry.icon),
                wind_mph: parse_numeric("wspd", &entry.wspd.english)?,
                is_daytime,
            }
        }
    };

    Ok(snapshot)
}

/// Epoch seconds for each of the next 24 whole hours, the instants a user
/// can pick a forecast for. `now` is truncated down to the hour first.
pub fn next_24_hours(now: DateTime<Utc>) -> Vec<i64> {
    let top_of_hour = now.timestamp() - now.timestamp().rem_euclid(3600);
    (1..=24).map(|i| top_of_hour + i * 3600).collect()
}

fn find_forecast(hourly: &[HourlyForecast], epoch: i64) -> Result<&HourlyForecast> {
    hourly
        .iter()
        .find(|entry| {
            entry
                .fcttime
                .epoch
                .trim()
                .parse::<i64>()
                .map(|e| e == epoch)
                .unwrap_or(false)
        })
        .ok_or_else(|| {
            RunGearError::MalformedPayload(format!("no forecast entry for requested time {}", epoch))
        })
}

fn sun_instant(date: NaiveDate, event: &SunEvent, shift_hours: i64) -> Result<NaiveDateTime> {
    let hour: i64 = event
        .hour
        .trim()
        .parse()
        .map_err(|_| RunGearError::MalformedPayload(format!("non-numeric sun hour '{}'", event.hour)))?;
    let minute: i64 = event.minute.trim().parse().map_err(|_| {
        RunGearError::MalformedPayload(format!("non-numeric sun minute '{}'", event.minute))
    })?;

    // Shifting may roll past midnight; Duration math handles the carry.
    Ok(date.and_time(NaiveTime::MIN) + Duration::hours(hour + shift_hours) + Duration::minutes(minute))
}

/// Provider offsets look like "-0400" or "+0530"; whole hours only.
fn parse_tz_offset(raw: &str) -> Result<i64> {
    let packed: i64 = raw
        .trim()
        .parse()
        .map_err(|_| RunGearError::MalformedPayload(format!("bad timezone offset '{}'", raw)))?;
    Ok(packed / 100)
}

fn parse_numeric(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .map_err(|_| RunGearError::MalformedPayload(format!("non-numeric {} '{}'", field, raw)))
}
