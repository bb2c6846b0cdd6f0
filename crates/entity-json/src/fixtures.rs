//! Classes shared by the unit tests of this crate.

use crate::EntityValidator;
use indexmap::IndexMap;
use model_core::{
    object_eq, register, register_class, ClassDef, ClassSpec, Model, ModelError, Object, Record,
    Required, Rule, Value,
};
use std::any::Any;
use std::sync::{Arc, Once, OnceLock};

static INIT: Once = Once::new();

/// Install a test subscriber and register every fixture class.
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();

        for def in [sample_class(), customer_class(), line_class(), order_class()] {
            register_class(Arc::clone(def)).unwrap();
        }
        register::<Point>().unwrap();
        register::<Contact>().unwrap();
    });
}

/// Self-nesting entity: `my_name` is read from and written to `name`.
fn sample_class() -> &'static Arc<ClassDef> {
    static CLASS: OnceLock<Arc<ClassDef>> = OnceLock::new();
    CLASS.get_or_init(|| {
        ClassDef::builder("Sample")
            .attributes(["id", "ids", "my_name", "entityTitle", "child", "list"])
            .field("my_name", "name")
            .entity("child", ClassSpec::one("Sample"))
            .entity("list", ClassSpec::many("Sample"))
            .build()
    })
}

fn customer_class() -> &'static Arc<ClassDef> {
    static CLASS: OnceLock<Arc<ClassDef>> = OnceLock::new();
    CLASS.get_or_init(|| {
        ClassDef::builder("Customer")
            .attributes(["name", "email"])
            .rule(Rule::new(["name"], Required))
            .build()
    })
}

fn line_class() -> &'static Arc<ClassDef> {
    static CLASS: OnceLock<Arc<ClassDef>> = OnceLock::new();
    CLASS.get_or_init(|| {
        ClassDef::builder("Line")
            .attributes(["sku", "quantity"])
            .rule(Rule::new(["sku"], Required))
            .build()
    })
}

fn order_class() -> &'static Arc<ClassDef> {
    static CLASS: OnceLock<Arc<ClassDef>> = OnceLock::new();
    CLASS.get_or_init(|| {
        ClassDef::builder("Order")
            .attributes(["number", "customer", "lines"])
            .entity("customer", ClassSpec::one("Customer"))
            .entity("lines", ClassSpec::many("Line"))
            .rule(Rule::new(["customer", "lines"], EntityValidator::new()))
            .build()
    })
}

pub fn sample() -> Record {
    Record::new(Arc::clone(sample_class()))
}

pub fn customer() -> Record {
    Record::new(Arc::clone(customer_class()))
}

pub fn line() -> Record {
    Record::new(Arc::clone(line_class()))
}

pub fn order() -> Record {
    Record::new(Arc::clone(order_class()))
}

/// Plain object with free-form fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Point {
    pub fields: IndexMap<String, Value>,
}

impl Object for Point {
    fn class_name(&self) -> &str {
        "Point"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn Object) -> bool {
        object_eq(self, other)
    }

    fn set_field(&mut self, name: &str, value: Value) -> bool {
        self.fields.insert(name.to_string(), value);
        true
    }
}

/// Model without JSON mapping; `home_phone` is not safe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contact {
    pub name: Value,
    pub email: Value,
    pub home_phone: Value,
}

impl Object for Contact {
    fn class_name(&self) -> &str {
        "Contact"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clone_object(&self) -> Box<dyn Object> {
        Box::new(self.clone())
    }

    fn eq_object(&self, other: &dyn Object) -> bool {
        object_eq(self, other)
    }

    fn as_model(&self) -> Option<&dyn Model> {
        Some(self)
    }

    fn as_model_mut(&mut self) -> Option<&mut dyn Model> {
        Some(self)
    }
}

impl Model for Contact {
    fn attributes(&self) -> Vec<String> {
        vec!["name".into(), "email".into(), "home_phone".into()]
    }

    fn attribute(&self, name: &str) -> Option<&Value> {
        match name {
            "name" => Some(&self.name),
            "email" => Some(&self.email),
            "home_phone" => Some(&self.home_phone),
            _ => None,
        }
    }

    fn set_attribute(&mut self, name: &str, value: Value) -> Result<(), ModelError> {
        let slot = match name {
            "name" => &mut self.name,
            "email" => &mut self.email,
            "home_phone" => &mut self.home_phone,
            _ => {
                return Err(ModelError::UnknownAttribute {
                    class: "Contact".to_string(),
                    attribute: name.to_string(),
                })
            }
        };
        *slot = value;
        Ok(())
    }

    fn safe_attributes(&self) -> Vec<String> {
        vec!["name".into(), "email".into()]
    }
}
