use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, TimeZone, Utc};
use chrono_tz::Tz;
use rrule::{Frequency, RRule, RRuleSet, Unvalidated};
use serde::Deserialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::models::{CalendarEvent, ResolvedOccurrenceSet};
use crate::timezone::resolve_local;
use crate::window::DayWindow;

/// Upper bound on occurrences collected per event and window.
pub const DEFAULT_MAX_OCCURRENCES: usize = 100;

/// `YYYYMMDDTHHMMSS`, the RFC 5545 local date-time form.
pub const COMPACT_FORMAT: &str = "%Y%m%dT%H%M%S";

/// `YYYYMMDDTHHMMSSZ`, the RFC 5545 UTC date-time form.
pub const UTC_COMPACT_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Stands in for a body without RRULE or RDATE lines: the anchor is the only occurrence.
const SINGLE_OCCURRENCE_RULE: &str = "RRULE:FREQ=DAILY;COUNT=1";

/// The reference start instant of a rule, truncated to whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Anchor(DateTime<Utc>);

impl Anchor {
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self(instant.trunc_subsecs(0))
    }

    /// From a millisecond epoch timestamp. `None` when out of range.
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::from_instant)
    }

    /// From the calendar store's microsecond epoch timestamp.
    pub fn from_micros(micros: i64) -> Option<Self> {
        Self::from_millis(micros.div_euclid(1000))
    }

    #[inline]
    pub fn instant(&self) -> DateTime<Utc> {
        self.0
    }

    /// Wall-clock time in `tz` as `YYYYMMDDTHHMMSS`.
    pub fn compact(&self, tz: &Tz) -> String {
        self.0.with_timezone(tz).format(COMPACT_FORMAT).to_string()
    }

    /// `DTSTART;TZID=<zone>:<compact>`
    pub fn dtstart_line(&self, tz: &Tz) -> String {
        format!("DTSTART;TZID={}:{}", tz.name(), self.compact(tz))
    }
}

impl fmt::Display for Anchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(UTC_COMPACT_FORMAT))
    }
}

/// A stored rule body paired with the anchor it is evaluated against.
///
/// The body never carries its own DTSTART. The two halves are only joined
/// when handed to the rule parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleDocument<'a> {
    pub anchor: Anchor,
    pub body: &'a str,
}

impl<'a> RuleDocument<'a> {
    pub fn new(anchor: Anchor, body: &'a str) -> Self {
        Self { anchor, body }
    }

    /// Normalised body lines: trimmed, blank lines dropped, bare `FREQ=`
    /// lines prefixed with `RRULE:`, floating `UNTIL` values pinned to UTC.
    pub fn body_lines(&self, tz: &Tz) -> Result<Vec<String>, String> {
        self.body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| normalize_line(line, tz))
            .collect()
    }

    /// The complete document as the rule parser sees it.
    pub fn render(&self, tz: &Tz) -> Result<String, String> {
        Ok(self.assemble(tz, self.body_lines(tz)?))
    }

    /// Parses the document. EXRULE lines are attached as exclusions after the
    /// rest has been parsed.
    pub fn to_rrule_set(&self, tz: &Tz) -> Result<RRuleSet, String> {
        let (exrules, lines): (Vec<String>, Vec<String>) = self
            .body_lines(tz)?
            .into_iter()
            .partition(|line| property_name(line) == "EXRULE");

        let document = self.assemble(tz, lines);
        let mut rule_set = document
            .parse::<RRuleSet>()
            .map_err(|e| format!("{} (in {:?})", e, document))?;

        let dt_start = *rule_set.get_dt_start();
        for line in exrules {
            let value = line.split_once(':').map_or(line.as_str(), |(_, value)| value);
            let exrule = value
                .parse::<RRule<Unvalidated>>()
                .and_then(|rule| rule.validate(dt_start))
                .map_err(|e| format!("{} (in {:?})", e, line))?;
            rule_set = rule_set.exrule(exrule);
        }
        Ok(rule_set)
    }

    fn assemble(&self, tz: &Tz, mut lines: Vec<String>) -> String {
        let generates = lines
            .iter()
            .any(|line| matches!(property_name(line).as_str(), "RRULE" | "RDATE"));
        if !generates {
            lines.insert(0, SINGLE_OCCURRENCE_RULE.to_string());
        }

        let mut document = self.anchor.dtstart_line(tz);
        for line in lines {
            document.push('\n');
            document.push_str(&line);
        }
        document
    }
}

fn property_name(line: &str) -> String {
    line.split([':', ';'])
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_uppercase()
}

fn normalize_line(line: &str, tz: &Tz) -> Result<String, String> {
    match property_name(line).as_str() {
        "RRULE" | "EXRULE" => Ok(pin_until(line, tz)),
        "RDATE" | "EXDATE" => Ok(line.to_string()),
        "DTSTART" => Err("rule body carries its own DTSTART".to_string()),
        _ if line.to_ascii_uppercase().starts_with("FREQ=") => Ok(pin_until(&format!("RRULE:{}", line), tz)),
        _ => Err(format!("unsupported rule line '{}'", line)),
    }
}

/// Rewrites a date-only or floating `UNTIL` as a UTC instant in `tz`.
///
/// A zoned DTSTART only accepts a UTC `UNTIL`. A date-only value means the end
/// of that day.
fn pin_until(line: &str, tz: &Tz) -> String {
    let Some((name, value)) = line.split_once(':') else {
        return line.to_string();
    };
    let parts: Vec<String> = value
        .split(';')
        .map(|part| match part.split_once('=') {
            Some((key, until)) if key.eq_ignore_ascii_case("UNTIL") => {
                format!("{}={}", key, utc_until(until, tz))
            }
            _ => part.to_string(),
        })
        .collect();
    format!("{}:{}", name, parts.join(";"))
}

fn utc_until(value: &str, tz: &Tz) -> String {
    let local = if let Ok(date) = NaiveDate::parse_from_str(value, "%Y%m%d") {
        date.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
    } else if let Ok(datetime) = NaiveDateTime::parse_from_str(value, COMPACT_FORMAT) {
        datetime
    } else {
        return value.to_string();
    };
    resolve_local(local.date(), local.time(), tz)
        .format(UTC_COMPACT_FORMAT)
        .to_string()
}

/// What to do with an event whose rule does not parse.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRulePolicy {
    /// Abort resolution with the first error.
    #[default]
    Fail,
    /// Log the event, leave it out and keep going.
    Skip,
}

/// Statistics collected during one resolution pass
#[derive(Debug, Clone, Default)]
pub struct ResolutionSummary {
    /// Number of events examined
    pub events_processed: usize,
    /// Events with at least one occurrence in the window
    pub events_occurring: usize,
    /// Events left out because their rule was malformed
    pub events_skipped: usize,
    /// Detailed error messages for skipped events
    pub errors: Vec<String>,
    /// Time taken for the operation
    pub duration_ms: u64,
}

/// The outcome of resolving every event of a run.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    /// One entry per successfully resolved event, in input order.
    pub sets: Vec<ResolvedOccurrenceSet<'a>>,
    pub summary: ResolutionSummary,
}

/// RecurrenceResolver: decides which events occur inside one day window.
///
/// Responsibilities:
/// 1. Anchor each stored rule at its event's start time in the configured timezone
/// 2. Parse the anchored rule with the `rrule` crate
/// 3. Collect the occurrences between the window bounds, both inclusive
#[derive(Debug, Clone)]
pub struct RecurrenceResolver {
    timezone: Tz,
    window: DayWindow,
    max_occurrences: usize,
    policy: MalformedRulePolicy,
}

impl RecurrenceResolver {
    pub fn new(timezone: Tz, window: DayWindow) -> Self {
        Self {
            timezone,
            window,
            max_occurrences: DEFAULT_MAX_OCCURRENCES,
            policy: MalformedRulePolicy::Fail,
        }
    }

    /// Resolver for today's window in `timezone`, computed once from the clock.
    pub fn for_today(timezone: Tz) -> Self {
        Self::new(timezone, DayWindow::today(&timezone))
    }

    pub fn with_max_occurrences(mut self, max_occurrences: usize) -> Self {
        self.max_occurrences = max_occurrences.max(1);
        self
    }

    pub fn with_policy(mut self, policy: MalformedRulePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn window(&self) -> &DayWindow {
        &self.window
    }

    pub fn timezone(&self) -> &Tz {
        &self.timezone
    }

    pub fn policy(&self) -> MalformedRulePolicy {
        self.policy
    }

    /// Resolves one event against the window.
    ///
    /// # Errors
    ///
    /// `CoreError::MalformedRule` when the rule body doesn't parse, and
    /// `CoreError::InvalidInput` when the start timestamp is out of range.
    pub fn resolve<'a>(&self, event: &'a CalendarEvent) -> Result<ResolvedOccurrenceSet<'a>, CoreError> {
        let anchor = Anchor::from_micros(event.start_micros).ok_or_else(|| {
            CoreError::InvalidInput(format!(
                "start timestamp {} of event '{}' is out of range",
                event.start_micros, event.title
            ))
        })?;

        let malformed = |reason: String| CoreError::MalformedRule {
            title: event.title.clone(),
            reason,
        };
        let mut rule_set = RuleDocument::new(anchor, &event.recurrence_rule)
            .to_rrule_set(&self.timezone)
            .map_err(&malformed)?;

        if let Some(later) = self.fast_forward(anchor, &rule_set) {
            debug!(title = %event.title, from = %anchor, to = %later, "fast-forwarding rule anchor");
            rule_set = RuleDocument::new(later, &event.recurrence_rule)
                .to_rrule_set(&self.timezone)
                .map_err(&malformed)?;
        }

        let occurrences = self.occurrences_in_window(rule_set);
        debug!(
            title = %event.title,
            anchor = %anchor,
            occurrences = occurrences.len(),
            "resolved event"
        );

        Ok(ResolvedOccurrenceSet {
            event,
            occurrences,
            window: self.window,
        })
    }

    /// Resolves every event, keeping input order.
    ///
    /// Under `MalformedRulePolicy::Fail` the first malformed event aborts the
    /// pass. Under `Skip` it is logged, counted and left out.
    pub fn resolve_all<'a>(&self, events: &'a [CalendarEvent]) -> Result<Resolution<'a>, CoreError> {
        let started = Instant::now();
        let mut summary = ResolutionSummary::default();
        let mut sets = Vec::with_capacity(events.len());

        for event in events {
            summary.events_processed += 1;
            match self.resolve(event) {
                Ok(set) => {
                    if set.occurs() {
                        summary.events_occurring += 1;
                    }
                    sets.push(set);
                }
                Err(e @ (CoreError::MalformedRule { .. } | CoreError::InvalidInput(_)))
                    if self.policy == MalformedRulePolicy::Skip =>
                {
                    warn!(title = %event.title, error = %e, "skipping calendar event");
                    summary.events_skipped += 1;
                    summary.errors.push(e.to_string());
                }
                Err(e) => return Err(e),
            }
        }

        summary.duration_ms = started.elapsed().as_millis() as u64;
        Ok(Resolution { sets, summary })
    }

    /// A later anchor in phase with a sub-daily rule, one day before the
    /// window, so the years between the event start and today are not walked
    /// one occurrence at a time.
    ///
    /// `None` when the rule's occurrences depend on where it starts counting
    /// (`COUNT`, `BYSETPOS`, exclusion rules) or when skipping gains nothing.
    fn fast_forward(&self, anchor: Anchor, rule_set: &RRuleSet) -> Option<Anchor> {
        let [rule] = rule_set.get_rrule().as_slice() else {
            return None;
        };
        if rule.get_count().is_some()
            || !rule.get_by_set_pos().is_empty()
            || !rule_set.get_exrule().is_empty()
        {
            return None;
        }

        let unit_seconds = match rule.get_freq() {
            Frequency::Hourly => 3_600,
            Frequency::Minutely => 60,
            Frequency::Secondly => 1,
            _ => return None,
        };
        let step_seconds = unit_seconds * i64::from(rule.get_interval().max(1));

        // rrule counts intervals on the wall clock
        let from = anchor.instant().with_timezone(&self.timezone).naive_local();
        let target = (self.window.start - Duration::days(1))
            .with_timezone(&self.timezone)
            .naive_local();
        let steps = (target - from).num_seconds() / step_seconds;
        if steps <= 0 {
            return None;
        }

        let shifted = from + Duration::seconds(steps.checked_mul(step_seconds)?);
        let instant = self.timezone.from_local_datetime(&shifted).single()?.with_timezone(&Utc);
        if rule.get_until().is_some_and(|until| until.with_timezone(&Utc) < instant) {
            return None;
        }
        Some(Anchor::from_instant(instant))
    }

    fn occurrences_in_window(&self, rule_set: RRuleSet) -> Vec<DateTime<Utc>> {
        rule_set
            .into_iter()
            .map(|dt| dt.with_timezone(&Utc))
            .skip_while(|dt| *dt < self.window.start)
            .take_while(|dt| *dt <= self.window.end)
            .take(self.max_occurrences)
            .collect()
    }
}
