//! Owning wrappers for shell handles.
//! Each acquisition is paired with exactly one release, run on drop.

use crate::error::Result;
use crate::shell::{IconHandle, MenuHandle, TrayShell};
use std::fmt;
use std::rc::Rc;

/// A handle type the shell knows how to release
pub trait ShellResource: Copy + fmt::Debug {
    fn release(self, shell: &dyn TrayShell);
}

impl ShellResource for IconHandle {
    fn release(self, shell: &dyn TrayShell) {
        shell.destroy_icon(self);
    }
}

impl ShellResource for MenuHandle {
    fn release(self, shell: &dyn TrayShell) {
        shell.destroy_menu(self);
    }
}

/// Exclusive owner of one shell handle
pub struct Owned<H: ShellResource> {
    handle: H,
    shell: Rc<dyn TrayShell>,
}

pub type OwnedIcon = Owned<IconHandle>;
pub type OwnedMenu = Owned<MenuHandle>;

impl<H: ShellResource> Owned<H> {
    /// Take ownership of a handle acquired elsewhere
    pub fn adopt(shell: &Rc<dyn TrayShell>, handle: H) -> Self {
        Self {
            handle,
            shell: Rc::clone(shell),
        }
    }

    pub fn handle(&self) -> H {
        self.handle
    }
}

impl OwnedIcon {
    pub fn load(shell: &Rc<dyn TrayShell>, path: &str) -> Result<Self> {
        let handle = shell.load_icon(path)?;
        Ok(Self::adopt(shell, handle))
    }
}

impl<H: ShellResource> Drop for Owned<H> {
    fn drop(&mut self) {
        self.handle.release(&*self.shell);
    }
}

impl<H: ShellResource> fmt::Debug for Owned<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Owned").field(&self.handle).finish()
    }
}
