//! Axis-separated collision resolution against static rectangles.
//!
//! The full horizontal displacement is applied and clamped first; the vertical
//! displacement is applied by the caller (gravity-integrated for the player,
//! direct directional speed for the dragon) and clamped second against the
//! already-corrected horizontal position. Resolving one axis at a time keeps a
//! body sliding along surfaces instead of snagging on tile seams.
//!
//! The world scrolls every obstacle rectangle each frame, so obstacles are
//! swept as plain slices; there is no static spatial index to invalidate.

use dwe_core::rect::Rect;

/// Which sides of a controlled body touched something this frame.
///
/// Side and ceiling flags are rebuilt every frame. The ground flag persists
/// across frames while standing and is dropped by `drop_stale_ground` the
/// moment vertical velocity says the body cannot still be grounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContactState {
    pub on_ground: bool,
    pub on_ceiling: bool,
    pub on_left: bool,
    pub on_right: bool,
}

impl ContactState {
    /// Clear the per-frame flags before a new resolution pass.
    pub fn begin_pass(&mut self) {
        self.on_ceiling = false;
        self.on_left = false;
        self.on_right = false;
    }
}

/// Move `rect` horizontally by `dx`, clamping against every intersecting solid.
pub fn resolve_horizontal(rect: &mut Rect, dx: f32, solids: &[Rect], contacts: &mut ContactState) {
    rect.translate(dx, 0.0);

    for solid in solids {
        if rect.overlaps(solid) {
            if dx < 0.0 {
                rect.set_left(solid.right());
                contacts.on_left = true;
            } else if dx > 0.0 {
                rect.set_right(solid.left());
                contacts.on_right = true;
            }
        }
    }
}

/// Clamp an already-displaced `rect` against solids on the vertical axis.
///
/// Falling bodies land on obstacle tops; rising bodies bump obstacle bottoms.
/// Both clamp zeroes `velocity_y`, so a later pass over another solid group
/// sees no remaining motion and leaves the rect alone. Returns true when the
/// body landed on one of `solids` during this call.
pub fn resolve_vertical(
    rect: &mut Rect,
    velocity_y: &mut f32,
    solids: &[Rect],
    contacts: &mut ContactState,
) -> bool {
    let mut landed = false;

    for solid in solids {
        if rect.overlaps(solid) {
            if *velocity_y > 0.0 {
                rect.set_bottom(solid.top());
                *velocity_y = 0.0;
                contacts.on_ground = true;
                landed = true;
            } else if *velocity_y < 0.0 {
                rect.set_top(solid.bottom());
                *velocity_y = 0.0;
                contacts.on_ceiling = true;
            }
        }
    }

    landed
}

/// Drop a ground flag that vertical velocity has made impossible: the body is
/// either jumping (negative) or has fallen for more than one step (> 1.0).
/// Without this, a stale flag would suppress the fall state after walking off
/// a ledge.
pub fn drop_stale_ground(velocity_y: f32, contacts: &mut ContactState) {
    if contacts.on_ground && (velocity_y < 0.0 || velocity_y > 1.0) {
        contacts.on_ground = false;
    }
}
