//! Representative derived types and `proptest` strategies over them,
//! exercised by `properties.rs`. Kept separate from the property tests
//! themselves so the shapes are easy to extend without cluttering the
//! assertions.

use std::collections::BTreeMap;

use dataitem::{Decode, Encode};
use proptest::prelude::*;

#[derive(Clone, Debug, PartialEq, Encode, Decode)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub tags: Vec<String>,
    pub bio: Option<String>,
    pub scores: BTreeMap<String, i32>,
}

fn gen_name() -> impl Strategy<Value = String> {
    "[a-zA-Z][a-zA-Z0-9_ ]{0,15}"
}

pub fn gen_profile() -> impl Strategy<Value = Profile> {
    (
        gen_name(),
        0u32..130,
        proptest::collection::vec(gen_name(), 0..6),
        proptest::option::of(gen_name()),
        proptest::collection::btree_map(gen_name(), any::<i32>(), 0..4),
    )
        .prop_map(|(name, age, tags, bio, scores)| Profile {
            name,
            age,
            tags,
            bio,
            scores,
        })
}

/// An internally-tagged sum type: the discriminant shares the same map
/// as the variant's own fields.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
#[dataitem(tag = "type")]
pub enum Event {
    Ping,
    Message { from: String, body: String },
    Code(i32),
}

pub fn gen_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::Ping),
        (gen_name(), gen_name()).prop_map(|(from, body)| Event::Message { from, body }),
        any::<i32>().prop_map(Event::Code),
    ]
}

/// An adjacently-tagged sum type: fields nest under a separate `content`
/// key instead of sharing the discriminant's map.
#[derive(Clone, Debug, PartialEq, Encode, Decode)]
#[dataitem(tag = "kind", content = "data")]
pub enum Shape {
    Circle(f64),
    Rectangle { width: f64, height: f64 },
    Point,
}

pub fn gen_shape() -> impl Strategy<Value = Shape> {
    prop_oneof![
        (-1000.0f64..1000.0).prop_map(Shape::Circle),
        (0.0f64..1000.0, 0.0f64..1000.0).prop_map(|(width, height)| Shape::Rectangle { width, height }),
        Just(Shape::Point),
    ]
}
