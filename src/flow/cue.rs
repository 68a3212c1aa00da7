use crate::foundation::error::{FlowError, FlowResult};
use std::collections::BTreeMap;

/// Tolerance, in seconds, when comparing scene time against a cue time.
const CUE_EPSILON: f64 = 1e-9;

/// External timeline of named cues, polled once per step for every pending `wait_until`.
pub trait CueSource {
    /// Return `true` once scene time `now` has reached or passed `label`.
    fn has_reached(&self, label: &str, now: f64) -> bool;

    /// Exact time of `label`, when the source knows it.
    ///
    /// A thread resumed by a cue takes this as its logical time, so waits that follow are
    /// measured from the cue rather than from the frame that observed it.
    fn cue_time(&self, _label: &str) -> Option<f64> {
        None
    }
}

/// Cue source with no cues: every `wait_until` stays suspended.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoCues;

impl CueSource for NoCues {
    fn has_reached(&self, _label: &str, _now: f64) -> bool {
        false
    }
}

/// One named timestamp.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Cue {
    /// Label matched by `wait_until`.
    pub name: String,
    /// Scene time in seconds.
    pub time: f64,
}

/// In-memory cue timeline, e.g. loaded from an audio track's metadata.
///
/// JSON form: `{"cues": [{"name": "initSound", "time": 1.2}]}`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CueTimeline {
    cues: BTreeMap<String, f64>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct CueTimelineRepr {
    cues: Vec<Cue>,
}

impl CueTimeline {
    /// Empty timeline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or move a cue.
    pub fn insert(&mut self, name: impl Into<String>, time: f64) -> FlowResult<()> {
        let name = name.into();
        if !time.is_finite() || time < 0.0 {
            return Err(FlowError::validation(format!(
                "cue \"{name}\" time must be finite and >= 0, got {time}"
            )));
        }
        self.cues.insert(name, time);
        Ok(())
    }

    /// Builder form of [`CueTimeline::insert`].
    pub fn with_cue(mut self, name: impl Into<String>, time: f64) -> FlowResult<Self> {
        self.insert(name, time)?;
        Ok(self)
    }

    /// Time of cue `name`, if present.
    pub fn time_of(&self, name: &str) -> Option<f64> {
        self.cues.get(name).copied()
    }

    /// Number of cues.
    pub fn len(&self) -> usize {
        self.cues.len()
    }

    /// `true` when the timeline has no cues.
    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    /// Cues ordered by time, then name.
    pub fn cues(&self) -> Vec<Cue> {
        let mut out: Vec<Cue> = self
            .cues
            .iter()
            .map(|(name, time)| Cue {
                name: name.clone(),
                time: *time,
            })
            .collect();
        out.sort_by(|a, b| a.time.total_cmp(&b.time).then_with(|| a.name.cmp(&b.name)));
        out
    }

    /// Parse the JSON form. Duplicate names are rejected.
    pub fn from_json(s: &str) -> FlowResult<Self> {
        let repr: CueTimelineRepr = serde_json::from_str(s)?;
        let mut out = Self::new();
        for cue in repr.cues {
            if out.cues.contains_key(&cue.name) {
                return Err(FlowError::validation(format!(
                    "duplicate cue \"{}\"",
                    cue.name
                )));
            }
            out.insert(cue.name, cue.time)?;
        }
        Ok(out)
    }

    /// Serialize to the JSON form read by [`CueTimeline::from_json`].
    pub fn to_json(&self) -> FlowResult<String> {
        let repr = CueTimelineRepr { cues: self.cues() };
        Ok(serde_json::to_string(&repr)?)
    }
}

impl CueSource for CueTimeline {
    fn has_reached(&self, label: &str, now: f64) -> bool {
        self.time_of(label)
            .is_some_and(|t| now + CUE_EPSILON >= t)
    }

    fn cue_time(&self, label: &str) -> Option<f64> {
        self.time_of(label)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/flow/cue.rs"]
mod tests;
