use crate::math::Point2d;
#[cfg(feature = "debug")]
use serde_json::json;

#[cfg(feature = "debug")]
thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

/// Records a line segment in the current debug frame.
#[allow(unused)]
pub fn debug_line(name: &str, p1: Point2d, p2: Point2d) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "line",
            "name": name,
            "p1": [p1.x, p1.y],
            "p2": [p2.x, p2.y],
        }))
    })
}

/// Records a circle in the current debug frame.
#[allow(unused)]
pub fn debug_circle(name: &str, centre: Point2d, radius: f64) {
    #[cfg(feature = "debug")]
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "circle",
            "name": name,
            "centre": [centre.x, centre.y],
            "radius": radius,
        }))
    })
}

/// Takes every shape recorded since the last call.
#[cfg(feature = "debug")]
pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}

#[cfg(all(test, feature = "debug"))]
mod test {
    use super::*;

    #[test]
    fn frames_are_taken() {
        debug_line("route", Point2d::new(0.0, 0.0), Point2d::new(3.0, 4.0));
        debug_circle("aim", Point2d::new(1.0, 2.0), 4.0);
        let frame = take_debug_frame();
        assert_eq!(frame[0]["type"], "line");
        assert_eq!(frame[1]["type"], "circle");
        assert_eq!(frame[1]["radius"], 4.0);
        assert_eq!(take_debug_frame(), json!([]));
    }
}
