//! Built-in gesture scenarios
//!
//! All run on the default surface (viewport 400, content 1000, 40 rows of
//! 60px) unless noted, so the container extent is 400 and the content can
//! scroll 600px.

use super::script::GestureScript;
use super::surface::SurfaceConfig;

/// Names of every built-in scenario
pub const NAMES: &[&str] = &[
    "drag-through",
    "fling-content-to-list",
    "fling-back-to-content",
    "list-to-parent",
    "filler-drag",
    "multi-touch",
    "repair",
];

/// Look up a built-in scenario by name
pub fn builtin(name: &str) -> Option<GestureScript> {
    let script = match name {
        "drag-through" => drag_through(),
        "fling-content-to-list" => fling_content_to_list(),
        "fling-back-to-content" => fling_back_to_content(),
        "list-to-parent" => list_to_parent(),
        "filler-drag" => filler_drag(),
        "multi-touch" => multi_touch(),
        "repair" => repair(),
        _ => return None,
    };
    Some(script)
}

/// Every built-in scenario, in [`NAMES`] order
pub fn all() -> Vec<GestureScript> {
    NAMES.iter().filter_map(|name| builtin(name)).collect()
}

fn drag_through() -> GestureScript {
    GestureScript::new("drag-through")
        .describe("650px drag up the content: content stops at 600, the container takes 50")
        .down(390.0)
        .drag(-260.0, 26)
        .hold(8)
        .release()
        .settle(600)
}

fn fling_content_to_list() -> GestureScript {
    GestureScript::new("fling-content-to-list")
        .describe("content fling hits its bottom, the container carries it into the list")
        .jump(None, Some(300), None)
        .down(300.0)
        .drag(100.0, 4)
        .release()
        .settle(900)
}

fn fling_back_to_content() -> GestureScript {
    GestureScript::new("fling-back-to-content")
        .describe("downward flick mid-transition, the container hands momentum to the content")
        .jump(Some(300), Some(600), None)
        .down(50.0)
        .drag(210.0, 4)
        .release()
        .settle(900)
}

fn list_to_parent() -> GestureScript {
    GestureScript::new("list-to-parent")
        .describe("list fling crosses its top, runs through the container into the content")
        .jump(Some(400), Some(600), Some(300))
        .down(200.0)
        .drag(360.0, 4)
        .release()
        .settle(900)
}

fn filler_drag() -> GestureScript {
    GestureScript::new("filler-drag")
        .describe("drag on the filler between content and list scrolls the container itself")
        .with_surface(SurfaceConfig::default().with_filler(100))
        .jump(Some(100), Some(600), None)
        .down(350.0)
        .drag(150.0, 4)
        .hold(8)
        .release()
        .settle(600)
}

fn multi_touch() -> GestureScript {
    GestureScript::new("multi-touch")
        .describe("two-finger stream passes through without any coordination")
        .jump(Some(200), Some(600), None)
        .second_pointer(250.0)
        .down(300.0)
        .drag(100.0, 4)
        .release()
        .frames(10)
}

fn repair() -> GestureScript {
    GestureScript::new("repair")
        .describe("inconsistent mid-transition state is repaired at pointer-down")
        .jump(Some(250), Some(100), None)
        .down(450.0)
        .release()
        .frames(2)
}
