use std::collections::{HashSet, VecDeque};

use winit::event::{DeviceEvent, ElementState, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Whether a key went down or came up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    Press,
    Release,
}

/// A window-system input event, reduced to what the demo reacts to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    Key { key: KeyCode, action: KeyAction },
    /// Raw pointer motion in pixels, y positive upwards. Arrives even while
    /// the cursor is locked.
    MouseMotion { dx: f32, dy: f32 },
    /// Vertical scroll, in lines.
    Scroll { delta: f32 },
    FocusChanged { focused: bool },
    CloseRequested,
}

impl InputEvent {
    pub fn press(key: KeyCode) -> Self {
        Self::Key {
            key,
            action: KeyAction::Press,
        }
    }

    pub fn release(key: KeyCode) -> Self {
        Self::Key {
            key,
            action: KeyAction::Release,
        }
    }

    /// Translate a winit event. Auto-repeat presses and events the demo does
    /// not use map to `None`.
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                let PhysicalKey::Code(key) = event.physical_key else {
                    return None;
                };
                match event.state {
                    ElementState::Pressed if event.repeat => None,
                    ElementState::Pressed => Some(Self::press(key)),
                    ElementState::Released => Some(Self::release(key)),
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let delta = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                Some(Self::Scroll { delta })
            }
            WindowEvent::Focused(focused) => Some(Self::FocusChanged { focused: *focused }),
            WindowEvent::CloseRequested => Some(Self::CloseRequested),
            _ => None,
        }
    }

    /// Translate a raw device event. Only mouse motion is kept; winit reports
    /// y growing downwards, so it is flipped here.
    pub fn from_device_event(event: &DeviceEvent) -> Option<Self> {
        match event {
            DeviceEvent::MouseMotion { delta: (dx, dy) } => Some(Self::MouseMotion {
                dx: *dx as f32,
                dy: -*dy as f32,
            }),
            _ => None,
        }
    }
}

/// An input event and the time it arrived, in seconds since startup.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimedEvent {
    pub time: f32,
    pub event: InputEvent,
}

/// Events collected between frames, drained once per frame in arrival order.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<TimedEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: f32, event: InputEvent) {
        self.events.push_back(TimedEvent { time, event });
    }

    pub fn drain(&mut self) -> impl Iterator<Item = TimedEvent> + '_ {
        self.events.drain(..)
    }
}

/// Tracks which keys are currently held.
#[derive(Debug, Default)]
pub struct KeyTable {
    keys_down: HashSet<KeyCode>,
}

impl KeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key edge. Returns `true` if the held state changed.
    pub fn apply(&mut self, key: KeyCode, action: KeyAction) -> bool {
        match action {
            KeyAction::Press => self.keys_down.insert(key),
            KeyAction::Release => self.keys_down.remove(&key),
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn clear(&mut self) {
        self.keys_down.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_drains_in_arrival_order() {
        let mut queue = EventQueue::new();
        queue.push(0.5, InputEvent::press(KeyCode::KeyW));
        queue.push(0.6, InputEvent::MouseMotion { dx: 1.0, dy: 2.0 });
        queue.push(0.6, InputEvent::release(KeyCode::KeyW));

        let drained: Vec<_> = queue.drain().map(|e| (e.time, e.event)).collect();
        assert_eq!(
            drained,
            vec![
                (0.5, InputEvent::press(KeyCode::KeyW)),
                (0.6, InputEvent::MouseMotion { dx: 1.0, dy: 2.0 }),
                (0.6, InputEvent::release(KeyCode::KeyW)),
            ]
        );
        assert_eq!(queue.drain().count(), 0);
    }

    #[test]
    fn key_table_tracks_held_keys() {
        let mut keys = KeyTable::new();
        assert!(keys.apply(KeyCode::KeyA, KeyAction::Press));
        assert!(!keys.apply(KeyCode::KeyA, KeyAction::Press));
        assert!(keys.key_down(KeyCode::KeyA));
        assert!(!keys.key_down(KeyCode::KeyD));

        assert!(keys.apply(KeyCode::KeyA, KeyAction::Release));
        assert!(!keys.key_down(KeyCode::KeyA));
        assert!(!keys.apply(KeyCode::KeyA, KeyAction::Release));
    }

    #[test]
    fn mouse_motion_flips_vertical_axis() {
        let event = DeviceEvent::MouseMotion { delta: (12.0, 5.0) };
        assert_eq!(
            InputEvent::from_device_event(&event),
            Some(InputEvent::MouseMotion { dx: 12.0, dy: -5.0 })
        );
        let button = DeviceEvent::Button {
            button: 0,
            state: ElementState::Pressed,
        };
        assert_eq!(InputEvent::from_device_event(&button), None);
    }

    #[test]
    fn focus_changes_are_forwarded() {
        assert_eq!(
            InputEvent::from_window_event(&WindowEvent::Focused(false)),
            Some(InputEvent::FocusChanged { focused: false })
        );
    }
}
