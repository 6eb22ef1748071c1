//! The input-primitive plan IR and its dispatch.

use webhelm_core_types::Coordinate;
use webhelm_driver::{Driver, DriverError, MouseButton};

/// One low-level input primitive in a translated plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// Absolute pointer move in native pixels.
    MoveTo(Coordinate),
    /// Relative pointer move in native pixels.
    MoveBy { dx: i32, dy: i32 },
    ButtonDown(MouseButton),
    ButtonUp(MouseButton),
    Click(MouseButton),
    DoubleClick(MouseButton),
    KeyDown(String),
    KeyTap(String),
    KeyUp(String),
    SendText(String),
    /// Vertical scroll; positive scrolls down.
    ScrollBy(i32),
    /// Activate the tab with this handle.
    SwitchTab(String),
}

/// Execute a plan against the driver, one primitive at a time, stopping at
/// the first failure.
pub async fn dispatch(driver: &dyn Driver, plan: &[InputEvent]) -> Result<(), DriverError> {
    for event in plan {
        match event {
            InputEvent::MoveTo(target) => driver.move_mouse_to(*target).await?,
            InputEvent::MoveBy { dx, dy } => driver.move_mouse_by(*dx, *dy).await?,
            InputEvent::ButtonDown(button) => driver.button_down(*button).await?,
            InputEvent::ButtonUp(button) => driver.button_up(*button).await?,
            InputEvent::Click(button) => driver.click(*button).await?,
            InputEvent::DoubleClick(button) => driver.double_click(*button).await?,
            InputEvent::KeyDown(key) => driver.key_down(key).await?,
            InputEvent::KeyTap(key) => driver.key_tap(key).await?,
            InputEvent::KeyUp(key) => driver.key_up(key).await?,
            InputEvent::SendText(text) => driver.send_text(text).await?,
            InputEvent::ScrollBy(delta) => driver.scroll_by(*delta).await?,
            InputEvent::SwitchTab(handle) => driver.switch_tab(handle).await?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use webhelm_driver::testing::FakeDriver;

    #[tokio::test]
    async fn dispatch_walks_the_plan_in_order() {
        let driver = FakeDriver::new();
        let plan = vec![
            InputEvent::KeyDown("Control".into()),
            InputEvent::KeyTap("a".into()),
            InputEvent::KeyUp("Control".into()),
        ];

        dispatch(&driver, &plan).await.unwrap();
        assert_eq!(
            driver.calls(),
            vec!["key_down(Control)", "key_tap(a)", "key_up(Control)"]
        );
    }

    #[tokio::test]
    async fn dispatch_stops_at_first_failure() {
        let driver = FakeDriver::new();
        driver.fail_inputs(DriverError::NotInteractable("covered".into()));
        let plan = vec![
            InputEvent::Click(MouseButton::Left),
            InputEvent::SendText("never sent".into()),
        ];

        let err = dispatch(&driver, &plan).await.unwrap_err();
        assert_eq!(err, DriverError::NotInteractable("covered".into()));
        assert_eq!(driver.calls(), vec!["click(left)"]);
    }
}
