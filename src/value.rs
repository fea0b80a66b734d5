use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::iter::FromIterator;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }
}

/// An RGB colour. Components are kept exactly as written, so values outside
/// 0..=255 survive reading.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Color {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl Color {
    pub fn new(r: i32, g: i32, b: i32) -> Self {
        Color { r, g, b }
    }
}

/// A string-keyed map that remembers insertion order.
///
/// Keys are lowercased on the way in and lookups ignore case. Inserting an
/// existing key replaces the value but keeps the key's original slot.
#[derive(Clone, PartialEq, Default)]
pub struct PropertyList {
    entries: Vec<(String, Value)>,
    // Lowercased key to its slot in `entries`.
    index: HashMap<String, usize>,
}

/// Lowercases `key`, borrowing it when it is lowercase already.
fn fold_case(key: &str) -> Cow<'_, str> {
    if key.chars().all(|c| c.to_lowercase().eq(std::iter::once(c))) {
        Cow::Borrowed(key)
    } else {
        Cow::Owned(key.to_lowercase())
    }
}

impl PropertyList {
    pub fn new() -> Self {
        Default::default()
    }

    fn slot(&self, key: &str) -> Option<usize> {
        self.index.get(fold_case(key).as_ref()).copied()
    }

    /// Returns the previous value stored under `key`, if any.
    pub fn insert(&mut self, key: impl AsRef<str>, value: Value) -> Option<Value> {
        let key = fold_case(key.as_ref());
        match self.index.get(key.as_ref()) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, value)),
            None => {
                let key = key.into_owned();
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.slot(key).map(|i| &self.entries[i].1)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        match self.slot(key) {
            Some(i) => Some(&mut self.entries[i].1),
            None => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.slot(key).is_some()
    }

    /// Removes `key`, shifting later entries down one slot.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let i = self.index.remove(fold_case(key).as_ref())?;
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(self.entries.remove(i).1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }
}

impl fmt::Debug for PropertyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for PropertyList {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut list = PropertyList::new();
        for (key, value) in iter {
            list.insert(key, value);
        }
        list
    }
}

impl IntoIterator for PropertyList {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// A dynamically typed value read from serialized text.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Void,
    Integer(i32),
    Float(f32),
    String(String),
    Point(Point),
    Rect(Rect),
    Color(Color),
    LinearList(Vec<Value>),
    PropertyList(PropertyList),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Void => "Void",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::Point(_) => "Point",
            Value::Rect(_) => "Rect",
            Value::Color(_) => "Color",
            Value::LinearList(_) => "LinearList",
            Value::PropertyList(_) => "PropertyList",
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to floats; numeric fields are often written either way.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Integer(n) => Some(*n as f32),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_point(&self) -> Option<Point> {
        match self {
            Value::Point(p) => Some(*p),
            _ => None,
        }
    }

    pub fn as_rect(&self) -> Option<Rect> {
        match self {
            Value::Rect(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::LinearList(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_property_list(&self) -> Option<&PropertyList> {
        match self {
            Value::PropertyList(props) => Some(props),
            _ => None,
        }
    }

    /// Looks up `key` if this is a property list.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_property_list().and_then(|props| props.get(key))
    }

    /// Looks up element `index` if this is a linear list.
    pub fn index(&self, index: usize) -> Option<&Value> {
        self.as_list().and_then(|items| items.get(index))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Point> for Value {
    fn from(p: Point) -> Self {
        Value::Point(p)
    }
}

impl From<Rect> for Value {
    fn from(r: Rect) -> Self {
        Value::Rect(r)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::LinearList(items)
    }
}

impl From<PropertyList> for Value {
    fn from(props: PropertyList) -> Self {
        Value::PropertyList(props)
    }
}
