use crate::foundation::core::FrameIndex;
use crate::foundation::error::FlowResult;
use crate::signal::signal::Signal;
use xxhash_rust::xxh3::Xxh3;

const XXH3_SEED: u64 = 0x5eed_f10e_7a11_c0de;

/// A value source sampled once per evaluated frame.
pub trait Probe {
    /// Column name in the trace.
    fn label(&self) -> String;
    /// Current value as JSON.
    fn sample(&self) -> FlowResult<serde_json::Value>;
}

impl<T> Probe for Signal<T>
where
    T: serde::Serialize + Clone + 'static,
{
    fn label(&self) -> String {
        Signal::label(self)
    }

    fn sample(&self) -> FlowResult<serde_json::Value> {
        Ok(serde_json::to_value(self.read()?)?)
    }
}

/// Values of every probe at one frame, in registration order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FrameSample {
    /// Evaluated frame.
    pub frame: FrameIndex,
    /// Scene time of the frame.
    pub time: f64,
    /// One value per probe.
    pub values: Vec<serde_json::Value>,
}

/// Per-frame recording of watched signals.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Trace {
    /// Probe labels, one per column.
    pub labels: Vec<String>,
    /// Samples in frame order.
    pub frames: Vec<FrameSample>,
}

/// Stable 128-bit digest of a [`Trace`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TraceFingerprint {
    /// High 64 bits.
    pub hi: u64,
    /// Low 64 bits.
    pub lo: u64,
}

impl Trace {
    /// Column of values recorded for `label`, one per frame.
    pub fn column(&self, label: &str) -> Option<Vec<&serde_json::Value>> {
        let idx = self.labels.iter().position(|l| l == label)?;
        Some(
            self.frames
                .iter()
                .filter_map(|f| f.values.get(idx))
                .collect(),
        )
    }

    /// Value of `label` at `frame`, if that frame was recorded.
    pub fn value_at(&self, label: &str, frame: FrameIndex) -> Option<&serde_json::Value> {
        let idx = self.labels.iter().position(|l| l == label)?;
        self.frames
            .iter()
            .find(|f| f.frame == frame)
            .and_then(|f| f.values.get(idx))
    }

    /// Digest over labels, frame indices, times and the serialized values.
    ///
    /// Two runs of the same script with the same cue inputs yield equal fingerprints.
    pub fn fingerprint(&self) -> FlowResult<TraceFingerprint> {
        let mut h = StableHasher::new();
        h.write_u64(self.labels.len() as u64);
        for l in &self.labels {
            h.write_str(l);
        }
        for f in &self.frames {
            h.write_u64(f.frame.0);
            h.write_f64(f.time);
            h.write_u64(f.values.len() as u64);
            for v in &f.values {
                let bytes = serde_json::to_vec(v)?;
                h.write_u64(bytes.len() as u64);
                h.write_bytes(&bytes);
            }
        }
        Ok(h.finish())
    }

    /// Serialize the trace as JSON.
    pub fn to_json(&self) -> FlowResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

struct StableHasher {
    inner: Xxh3,
}

impl StableHasher {
    fn new() -> Self {
        Self {
            inner: Xxh3::with_seed(XXH3_SEED),
        }
    }

    fn write_bytes(&mut self, b: &[u8]) {
        self.inner.update(b);
    }

    fn write_u64(&mut self, v: u64) {
        self.write_bytes(&v.to_le_bytes());
    }

    fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    fn write_str(&mut self, s: &str) {
        self.write_u64(s.len() as u64);
        self.write_bytes(s.as_bytes());
    }

    fn finish(self) -> TraceFingerprint {
        let v = self.inner.digest128();
        TraceFingerprint {
            hi: (v >> 64) as u64,
            lo: v as u64,
        }
    }
}

/// Probes plus the trace they fill.
#[derive(Default)]
pub(crate) struct Recorder {
    probes: Vec<Box<dyn Probe>>,
    trace: Trace,
}

impl Recorder {
    pub(crate) fn watch(&mut self, probe: Box<dyn Probe>) {
        self.trace.labels.push(probe.label());
        self.probes.push(probe);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    pub(crate) fn sample(&mut self, frame: FrameIndex, time: f64) -> FlowResult<()> {
        if self.probes.is_empty() {
            return Ok(());
        }
        let values = self
            .probes
            .iter()
            .map(|p| p.sample())
            .collect::<FlowResult<Vec<_>>>()?;
        self.trace.frames.push(FrameSample {
            frame,
            time,
            values,
        });
        Ok(())
    }

    pub(crate) fn trace(&self) -> &Trace {
        &self.trace
    }
}
