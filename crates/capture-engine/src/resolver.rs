//! One-shot capability negotiation against the platform screenshot primitive.
//!
//! The resolver walks [`CaptureShape::PROBE_ORDER`] the first time a capture
//! is attempted and keeps the outcome for the rest of the process. Both a
//! bound shape and exhaustion are terminal: nothing is probed twice.

use glimpse_platform_core::{
    CaptureRequest, CaptureShape, CapturePlatform, CropRect, DisplayToken, ShapeCall, TokenSource,
};
use serde::Serialize;

/// The shape chosen for this process plus the handle it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundShape {
    pub shape: CaptureShape,
    /// Only looked up for [`CaptureShape::ThreeArg`]; may still be `None`
    /// when no lookup succeeded.
    pub display: Option<DisplayToken>,
}

/// Resolution state. `Bound` and `Failed` never change once reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CapabilityBinding {
    Unbound,
    Bound(BoundShape),
    Failed,
}

impl BoundShape {
    /// Build the concrete invocation for `request`.
    ///
    /// The two-argument shape cannot ask for natural size, so a natural
    /// request is replaced by `fallback` there and only there.
    pub fn call(&self, request: CaptureRequest, fallback: CaptureRequest) -> ShapeCall {
        let (width, height) = if request.is_natural() {
            (0, 0)
        } else {
            (request.width, request.height)
        };
        match self.shape {
            CaptureShape::FourArg => ShapeCall::FourArg {
                crop: CropRect::default(),
                width,
                height,
                rotation: 0,
            },
            CaptureShape::TwoArg => {
                let size = if request.is_natural() { fallback } else { request };
                ShapeCall::TwoArg {
                    width: size.width,
                    height: size.height,
                }
            }
            CaptureShape::ThreeArg => ShapeCall::ThreeArg {
                display: self.display,
                width,
                height,
            },
        }
    }
}

/// Finds and remembers which capture shape the platform supports.
#[derive(Debug, Clone)]
pub struct CapabilityResolver {
    binding: CapabilityBinding,
    fallback: CaptureRequest,
    probes: usize,
}

impl CapabilityResolver {
    /// `fallback` is the size substituted for natural-size requests on the
    /// two-argument shape.
    pub fn new(fallback: CaptureRequest) -> Self {
        Self {
            binding: CapabilityBinding::Unbound,
            fallback,
            probes: 0,
        }
    }

    /// Resolve the binding, probing only if nothing has been tried yet.
    pub fn resolve(&mut self, platform: &dyn CapturePlatform) -> CapabilityBinding {
        if self.binding != CapabilityBinding::Unbound {
            return self.binding;
        }

        self.binding = match self.probe_shapes(platform) {
            Some(shape) => {
                let display = if shape == CaptureShape::ThreeArg {
                    self.lookup_display(platform)
                } else {
                    None
                };
                let has_display = display.is_some();
                tracing::info!(
                    platform = platform.name(),
                    %shape,
                    arity = shape.arity(),
                    has_display,
                    "Capture shape bound"
                );
                CapabilityBinding::Bound(BoundShape { shape, display })
            }
            None => {
                tracing::error!(
                    platform = platform.name(),
                    probes = self.probes,
                    "No capture shape available; capture is disabled"
                );
                CapabilityBinding::Failed
            }
        };
        self.binding
    }

    /// Invocation for `request` under the current binding, if bound.
    pub fn call_for(&self, request: CaptureRequest) -> Option<ShapeCall> {
        match self.binding {
            CapabilityBinding::Bound(bound) => Some(bound.call(request, self.fallback)),
            _ => None,
        }
    }

    pub fn binding(&self) -> CapabilityBinding {
        self.binding
    }

    /// Platform probes issued so far (shapes and display lookups).
    pub fn probe_count(&self) -> usize {
        self.probes
    }

    fn probe_shapes(&mut self, platform: &dyn CapturePlatform) -> Option<CaptureShape> {
        for shape in CaptureShape::PROBE_ORDER {
            self.probes += 1;
            match platform.has_shape(shape) {
                Ok(true) => return Some(shape),
                Ok(false) => tracing::debug!(%shape, "Capture shape not exposed"),
                // A probe that errors is indistinguishable from an absent shape.
                Err(e) => tracing::debug!(%shape, error = %e, "Capture shape probe failed"),
            }
        }
        None
    }

    fn lookup_display(&mut self, platform: &dyn CapturePlatform) -> Option<DisplayToken> {
        for source in TokenSource::LOOKUP_ORDER {
            self.probes += 1;
            match platform.display_token(source) {
                Ok(Some(token)) => return Some(token),
                Ok(None) => tracing::debug!(?source, "Display token lookup returned nothing"),
                Err(e) => tracing::debug!(?source, error = %e, "Display token lookup failed"),
            }
        }
        tracing::warn!("No display token found; three-argument captures will pass none");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SyntheticPlatform;

    fn fallback() -> CaptureRequest {
        CaptureRequest::sized(720, 1280)
    }

    #[test]
    fn first_supported_shape_wins() {
        let platform = SyntheticPlatform::new(1080, 2400)
            .with_shapes(&[CaptureShape::TwoArg, CaptureShape::ThreeArg]);
        let mut resolver = CapabilityResolver::new(fallback());

        let binding = resolver.resolve(&platform);
        assert_eq!(
            binding,
            CapabilityBinding::Bound(BoundShape {
                shape: CaptureShape::TwoArg,
                display: None
            })
        );
        // four_arg rejected, two_arg accepted
        assert_eq!(resolver.probe_count(), 2);
    }

    #[test]
    fn resolving_twice_does_not_reprobe() {
        let platform = SyntheticPlatform::new(1080, 2400);
        let mut resolver = CapabilityResolver::new(fallback());

        let first = resolver.resolve(&platform);
        let probes = resolver.probe_count();
        let second = resolver.resolve(&platform);

        assert_eq!(first, second);
        assert_eq!(resolver.probe_count(), probes);
    }

    #[test]
    fn exhaustion_is_terminal() {
        let platform = SyntheticPlatform::new(1080, 2400).with_shapes(&[]);
        let mut resolver = CapabilityResolver::new(fallback());

        assert_eq!(resolver.resolve(&platform), CapabilityBinding::Failed);
        assert_eq!(resolver.probe_count(), 3);
        assert_eq!(resolver.resolve(&platform), CapabilityBinding::Failed);
        assert_eq!(resolver.probe_count(), 3);
        assert!(resolver.call_for(CaptureRequest::NATURAL).is_none());
    }

    #[test]
    fn probe_errors_count_as_unsupported() {
        let platform = SyntheticPlatform::new(1080, 2400)
            .with_shapes(&[CaptureShape::FourArg, CaptureShape::ThreeArg])
            .with_failing_probe(CaptureShape::FourArg);
        let mut resolver = CapabilityResolver::new(fallback());

        match resolver.resolve(&platform) {
            CapabilityBinding::Bound(bound) => assert_eq!(bound.shape, CaptureShape::ThreeArg),
            other => panic!("expected three_arg binding, got {other:?}"),
        }
    }

    #[test]
    fn three_arg_binding_carries_display_token() {
        let platform = SyntheticPlatform::new(1080, 2400)
            .with_shapes(&[CaptureShape::ThreeArg])
            .with_display_token(TokenSource::BuiltInDisplayZero, DisplayToken(7));
        let mut resolver = CapabilityResolver::new(fallback());
        resolver.resolve(&platform);

        assert_eq!(
            resolver.call_for(CaptureRequest::sized(540, 1200)),
            Some(ShapeCall::ThreeArg {
                display: Some(DisplayToken(7)),
                width: 540,
                height: 1200
            })
        );
        // three shapes + internal lookup (miss) + built-in lookup (hit)
        assert_eq!(resolver.probe_count(), 5);
    }

    #[test]
    fn two_arg_substitutes_fallback_for_natural_size() {
        let bound = BoundShape {
            shape: CaptureShape::TwoArg,
            display: None,
        };
        assert_eq!(
            bound.call(CaptureRequest::NATURAL, fallback()),
            ShapeCall::TwoArg {
                width: 720,
                height: 1280
            }
        );
        assert_eq!(
            bound.call(CaptureRequest::sized(1200, 540), fallback()),
            ShapeCall::TwoArg {
                width: 1200,
                height: 540
            }
        );
    }

    #[test]
    fn four_arg_keeps_natural_size_as_zero() {
        let bound = BoundShape {
            shape: CaptureShape::FourArg,
            display: None,
        };
        match bound.call(CaptureRequest::NATURAL, fallback()) {
            ShapeCall::FourArg {
                crop,
                width,
                height,
                rotation,
            } => {
                assert!(crop.is_empty());
                assert_eq!((width, height, rotation), (0, 0, 0));
            }
            other => panic!("unexpected call {other:?}"),
        }
    }
}
