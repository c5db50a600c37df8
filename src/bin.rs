//! Bin facade
//!
//! Bins group elements; they produce nothing themselves and are not
//! registered.

use crate::bridge::Bridge;
use crate::element::Element;
use crate::engine::Engine;

/// A container of elements
pub struct Bin<E: Engine> {
    bridge: Bridge<E>,
    handle: E::Bin,
}

impl<E: Engine> Bin<E> {
    pub(crate) fn attach(bridge: Bridge<E>, handle: E::Bin) -> Self {
        Self { bridge, handle }
    }

    pub(crate) fn handle(&self) -> &E::Bin {
        &self.handle
    }

    pub fn add_element(&self, element: &Element<E>) {
        self.bridge
            .engine()
            .bin_add_element(&self.handle, element.handle());
    }

    /// Find a named element and register it as a stream endpoint
    pub fn find_by_name(&self, name: &str) -> Option<Element<E>> {
        let handle = self.bridge.engine().bin_find_element(&self.handle, name)?;
        Some(Element::attach(self.bridge.clone(), handle))
    }
}

impl<E: Engine> std::fmt::Debug for Bin<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bin").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockEngine;

    #[test]
    fn test_find_by_name() {
        let bridge = Bridge::new(MockEngine::new());
        let bin = bridge.bin("sinks").unwrap();
        let sink = bridge.element("appsink", "out").unwrap();

        bin.add_element(&sink);
        let found = bin.find_by_name("out").unwrap();

        // Discovery registers a separate endpoint for the same native element
        assert_ne!(found.id(), sink.id());
        assert!(bridge.registry().contains(found.id()));
        assert!(bin.find_by_name("missing").is_none());
    }

    #[test]
    fn test_bin_create_failure() {
        let bridge = Bridge::new(MockEngine::new());
        assert_eq!(
            bridge.bin("").unwrap_err(),
            crate::Error::BinCreate(String::new())
        );
    }
}
