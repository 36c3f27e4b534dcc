use anyhow::{Context, Result};
use global_hotkey::{
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
    hotkey::{Code, HotKey, Modifiers},
};
use snapscribe_config::hotkey::HotkeyBinding;

pub struct HotkeyManager {
    manager: GlobalHotKeyManager,
    hotkey: HotKey,
}

impl HotkeyManager {
    /// Register the configured binding. Must stay on the thread that created it.
    pub fn new(binding: HotkeyBinding) -> Result<Self> {
        let (modifiers, code) = match binding {
            HotkeyBinding::CtrlShiftS => (Some(Modifiers::CONTROL | Modifiers::SHIFT), Code::KeyS),
            HotkeyBinding::F9 => (None, Code::F9),
        };
        Self::with_hotkey(modifiers, code)
    }

    pub fn with_hotkey(modifiers: Option<Modifiers>, code: Code) -> Result<Self> {
        let manager = GlobalHotKeyManager::new().context("Failed to create hotkey manager")?;

        let hotkey = HotKey::new(modifiers, code);

        manager
            .register(hotkey)
            .context("Failed to register hotkey")?;

        Ok(Self { manager, hotkey })
    }

    /// Check if the hotkey was pressed (non-blocking)
    pub fn poll(&self) -> bool {
        let receiver = GlobalHotKeyEvent::receiver();
        while let Ok(event) = receiver.try_recv() {
            if event.id == self.hotkey.id() && event.state == HotKeyState::Pressed {
                return true;
            }
            tracing::trace!("Ignoring hotkey event {:?}", event.id);
        }
        false
    }

    /// Get the hotkey ID for matching events
    pub fn id(&self) -> u32 {
        self.hotkey.id()
    }
}

impl Drop for HotkeyManager {
    fn drop(&mut self) {
        let _ = self.manager.unregister(self.hotkey);
    }
}
