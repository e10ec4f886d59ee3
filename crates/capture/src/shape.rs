use serde_json::{Map, Value};

type Object = Map<String, Value>;

/// Where the track fields live inside a page entry. Checked in declaration
/// order: an `item` object wins over a `resource` object, and an entry with
/// neither carries the track fields itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Nesting {
    Item,
    Resource,
    Bare,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RawItem<'a> {
    wrapper: &'a Object,
    track: &'a Object,
    nesting: Nesting,
}

impl<'a> RawItem<'a> {
    pub fn from_value(value: &'a Value) -> Option<Self> {
        let wrapper = value.as_object()?;
        let (track, nesting) = if let Some(inner) = wrapper.get("item").and_then(Value::as_object) {
            (inner, Nesting::Item)
        } else if let Some(inner) = wrapper.get("resource").and_then(Value::as_object) {
            (inner, Nesting::Resource)
        } else {
            (wrapper, Nesting::Bare)
        };
        Some(Self {
            wrapper,
            track,
            nesting,
        })
    }

    pub fn track(&self) -> &'a Object {
        self.track
    }

    /// Only genuine playlist entries carry an `itemUuid`, either on the
    /// entry or on its nested `item`. Recommendations mixed into the same
    /// response do not.
    pub fn is_playlist_entry(&self) -> bool {
        text(self.wrapper.get("itemUuid")).is_some()
            || (self.nesting == Nesting::Item && text(self.track.get("itemUuid")).is_some())
    }

    pub fn dedup_key(&self) -> Option<String> {
        text(self.track.get("itemUuid"))
            .or_else(|| text(self.wrapper.get("itemUuid")))
            .or_else(|| text(self.track.get("id")))
    }

    pub fn index(&self) -> f64 {
        number(self.track.get("index"))
            .or_else(|| number(self.wrapper.get("index")))
            .unwrap_or(0.0)
    }
}

/// A field as non-empty text. Numbers are rendered, everything else
/// (null, false, "", 0, objects) counts as absent.
pub(crate) fn text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

pub(crate) fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

pub(crate) fn flag(value: Option<&Value>) -> Option<bool> {
    match value? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64() != Some(0.0)),
        _ => None,
    }
}

pub(crate) fn object<'a>(value: Option<&'a Value>) -> Option<&'a Object> {
    value?.as_object()
}

/// The entry array of one items page: `data` first, then `items`.
pub(crate) fn page_items(page: &Value) -> Option<&Vec<Value>> {
    ["data", "items"]
        .iter()
        .find_map(|field| page.get(*field).and_then(Value::as_array))
}

/// The playlist descriptor of a metadata response, which is either wrapped
/// in `data` or returned bare.
pub(crate) fn descriptor(metadata: &Value) -> &Value {
    match metadata.get("data") {
        Some(inner) if inner.is_object() => inner,
        _ => metadata,
    }
}
