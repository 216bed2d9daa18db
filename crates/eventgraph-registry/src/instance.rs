//! The bypass-constructor instantiation seam.

use eventgraph_types::Value;

/// A bare instance of some registered class, produced by its factory without
/// ever running the class's real constructor. The deserializer consumes it
/// immediately: it reads [`class_name`](ClassInstance::class_name) to stamp
/// the resulting record's class marker, then
/// [`into_value`](ClassInstance::into_value) to obtain the backing record it
/// copies deserialized fields into.
pub trait ClassInstance: Send + Sync {
    /// The class name this instance was created for.
    fn class_name(&self) -> &str;

    /// Consume the bare instance, yielding its backing record value.
    fn into_value(self: Box<Self>) -> Value;
}

/// The default [`ClassInstance`]: a plain, empty record tagged with
/// `class_name`. Sufficient for any registered class whose fields are
/// fully described by the serialized data.
pub struct PlainClassInstance {
    class_name: String,
}

impl PlainClassInstance {
    /// Build a factory-ready bare instance for `class_name`.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self { class_name: class_name.into() }
    }
}

impl ClassInstance for PlainClassInstance {
    fn class_name(&self) -> &str {
        &self.class_name
    }

    fn into_value(self: Box<Self>) -> Value {
        let value = Value::new_record();
        if let Some(obj) = value.as_object() {
            if let eventgraph_types::GraphObject::Record(record) = &mut *obj.borrow_mut() {
                record.class_name = Some(self.class_name.clone());
            }
        }
        value
    }
}
