//! The compositor: a z-ordered stack of elements with fragment
//! maintenance.
//!
//! Every element on a [`Surface`] carries a list of *fragments*: disjoint
//! rectangles covering exactly the parts of its area not obscured by
//! elements above it. All mutations (add, remove, reshape, reorder) keep
//! the fragment lists consistent and return the [`Update`]s a device needs
//! to reflect the change, computed from element content clipped through the
//! fragments.
//!
//! Elements are owned by the surface; callers keep [`ElementId`] handles.
//! Handles are never reused, so a stale handle fails instead of aliasing a
//! newer element.

use log::{debug, trace};

use crate::device::Update;
use crate::error::{Error, Result};
use crate::geometry::{DIM_HIGH, Rectangle, Vector};
use crate::text::Text;

/// A participant in the element stack.
///
/// The trait surface is deliberately narrow: an element reports its area,
/// renders any sub-rectangle of itself on demand, and accepts a new area
/// when the surface reshapes it.
pub trait Element {
    /// The area this element occupies, in surface coordinates.
    fn area(&self) -> Rectangle;

    /// The element's content for `area`, in element-local coordinates.
    fn text(&self, area: Rectangle) -> Text;

    /// Takes note of a new area after a move or resize.
    fn reshape(&mut self, area: Rectangle);
}

/// Handle to an element owned by a [`Surface`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

struct Slot<E> {
    element: E,
    fragments: Vec<Rectangle>,
}

/// Splits `fragments` (pieces of an element with extent `area`) against a
/// mask list, leaving the uncovered remainder.
///
/// Fragments that do not meet a mask rectangle are retained whole, which is
/// what keeps the result a disjoint cover.
fn split(area: Rectangle, fragments: &mut Vec<Rectangle>, mask: &[Rectangle]) {
    for m in mask {
        if area.intersects(m) {
            let mut shards = Vec::with_capacity(fragments.len() + 3);
            for fragment in fragments.iter() {
                shards.extend(fragment.default_intersection(m));
            }
            *fragments = shards;
        }
    }
}

/// An ordered stack of elements (index 0 at the bottom) with maintained
/// fragment lists.
pub struct Surface<E> {
    slots: Vec<Option<Slot<E>>>,
    zorder: Vec<ElementId>,
}

impl<E: Element> Default for Surface<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Element> Surface<E> {
    pub fn new() -> Self {
        Self {
            slots: vec![],
            zorder: vec![],
        }
    }

    /// A surface seeded with one base element (conventionally a backdrop).
    ///
    /// No updates are produced: the base is assumed to describe what is
    /// already on the device.
    pub fn with_base(element: E) -> Self {
        let mut surface = Self::new();
        let area = element.area();
        surface.slots.push(Some(Slot {
            element,
            fragments: vec![area],
        }));
        surface.zorder.push(ElementId(0));
        surface
    }

    pub fn zorder(&self) -> &[ElementId] {
        &self.zorder
    }

    pub fn element(&self, id: ElementId) -> Option<&E> {
        self.slots.get(id.0)?.as_ref().map(|slot| &slot.element)
    }

    pub fn element_mut(&mut self, id: ElementId) -> Option<&mut E> {
        self.slots.get_mut(id.0)?.as_mut().map(|slot| &mut slot.element)
    }

    /// The fragment list of an element: disjoint rectangles covering its
    /// visible parts.
    pub fn fragments(&self, id: ElementId) -> Option<&[Rectangle]> {
        self.slots.get(id.0)?.as_ref().map(|slot| slot.fragments.as_slice())
    }

    fn slot(&self, id: ElementId) -> Result<&Slot<E>> {
        self.slots
            .get(id.0)
            .and_then(|slot| slot.as_ref())
            .ok_or_else(|| Self::missing(id))
    }

    fn slot_mut(&mut self, id: ElementId) -> Result<&mut Slot<E>> {
        self.slots
            .get_mut(id.0)
            .and_then(|slot| slot.as_mut())
            .ok_or_else(|| Self::missing(id))
    }

    // A missing element is a programming error, not a user error: fatal
    // under debug assertions, a typed error otherwise.
    fn missing(id: ElementId) -> Error {
        debug_assert!(false, "element {id:?} not present in surface");
        Error::InvariantViolation(format!("element {id:?} not present in surface"))
    }

    fn zindex(&self, id: ElementId) -> Result<usize> {
        self.zorder.iter().position(|&e| e == id).ok_or_else(|| Self::missing(id))
    }

    fn area_of(&self, id: ElementId) -> Rectangle {
        self.slot(id).map(|slot| slot.element.area()).unwrap_or_default()
    }

    /// One update per `(area, element)` pair, with the text taken from the
    /// element clipped to the area.
    fn emit(&self, pairs: &[(Rectangle, ElementId)]) -> Vec<Update> {
        pairs
            .iter()
            .filter_map(|&(area, id)| {
                let slot = self.slot(id).ok()?;
                let local = area - slot.element.area().position();
                Some(Update::new(area.position(), slot.element.text(local)))
            })
            .collect()
    }

    /// Rebuilds the fragment list of the element at z-index `z` from
    /// scratch by splitting its area against everything above it.
    fn rebuild_fragments(&mut self, z: usize) -> Result<()> {
        let id = self.zorder[z];
        let area = self.area_of(id);
        let mut fragments = vec![area];
        for above in z + 1..self.zorder.len() {
            let mask = self.slot(self.zorder[above])?.fragments.clone();
            split(area, &mut fragments, &mask);
        }
        self.slot_mut(id)?.fragments = fragments;
        Ok(())
    }

    /// Inserts an element below `below` (or on top), returning its handle
    /// and the updates for its visible parts.
    pub fn add_element(&mut self, element: E, below: Option<ElementId>) -> Result<(ElementId, Vec<Update>)> {
        let id = ElementId(self.slots.len());
        let area = element.area();
        let position = match below {
            Some(target) => self.zindex(target)?,
            None => self.zorder.len(),
        };
        self.slots.push(Some(Slot {
            element,
            fragments: vec![area],
        }));
        self.zorder.insert(position, id);
        debug!("add {id:?} area {area} at z {position}");

        // Carve the new element's fragments out of everything above it.
        let mut fragments = vec![area];
        for above in position + 1..self.zorder.len() {
            let mask = self.slot(self.zorder[above])?.fragments.clone();
            split(area, &mut fragments, &mask);
        }
        self.slot_mut(id)?.fragments = fragments;

        // Elements below the insertion lose whatever the new one covers.
        let mask = self.slot(id)?.fragments.clone();
        for z in (0..position).rev() {
            let lower = self.zorder[z];
            let lower_area = self.area_of(lower);
            if lower_area.intersects(&area) {
                split(lower_area, &mut self.slot_mut(lower)?.fragments, &mask);
            }
        }

        let pairs: Vec<_> = self.slot(id)?.fragments.iter().map(|&f| (f, id)).collect();
        Ok((id, self.emit(&pairs)))
    }

    /// Removes an element, handing it back along with the updates that
    /// repaint the region it uncovered.
    ///
    /// Lower elements are processed bottom-up.
    pub fn remove_element(&mut self, id: ElementId) -> Result<(E, Vec<Update>)> {
        let z = self.zindex(id)?;
        let area = self.area_of(id);
        self.zorder.remove(z);
        debug!("remove {id:?} area {area} from z {z}");

        let mut pairs = vec![];
        for lower in 0..z {
            if self.area_of(self.zorder[lower]).intersects(&area) {
                self.rebuild_fragments(lower)?;
                let lower_id = self.zorder[lower];
                for fragment in &self.slot(lower_id)?.fragments {
                    if let Some(damage) = fragment.intersection(&area) {
                        pairs.push((damage, lower_id));
                    }
                }
            }
        }
        let updates = self.emit(&pairs);
        let slot = self
            .slots
            .get_mut(id.0)
            .and_then(|slot| slot.take())
            .ok_or_else(|| Self::missing(id))?;
        Ok((slot.element, updates))
    }

    /// Moves or resizes an element, repainting every cell whose appearance
    /// may have changed.
    ///
    /// Reshaping an element to its current area emits nothing. Affected
    /// elements are processed top-down.
    pub fn reshape_element(&mut self, id: ElementId, area: Rectangle) -> Result<Vec<Update>> {
        let old = self.slot(id)?.element.area();
        if old == area {
            return Ok(vec![]);
        }
        let z = self.zindex(id)?;
        trace!("reshape {id:?} {old} -> {area}");
        let mut damage = old.default_intersection(&area);
        damage.push(area);
        let search = old | area;
        self.slot_mut(id)?.element.reshape(area);

        let mut pairs = vec![];
        for j in (0..=z).rev() {
            let current = self.zorder[j];
            if self.area_of(current).intersects(&search) {
                self.rebuild_fragments(j)?;
                for fragment in &self.slot(current)?.fragments {
                    for hurt in &damage {
                        if let Some(r) = fragment.intersection(hurt) {
                            pairs.push((r, current));
                        }
                    }
                }
            }
        }
        Ok(self.emit(&pairs))
    }

    fn reorder(&mut self, id: ElementId, to: usize) -> Result<Vec<Update>> {
        let from = self.zindex(id)?;
        if from == to {
            return Ok(vec![]);
        }
        self.zorder.remove(from);
        self.zorder.insert(to, id);
        debug!("reorder {id:?} z {from} -> {to}");
        let area = self.area_of(id);
        let (lo, hi) = (from.min(to), from.max(to));

        let mut pairs = vec![];
        for j in (lo..=hi).rev() {
            let current = self.zorder[j];
            if self.area_of(current).intersects(&area) {
                self.rebuild_fragments(j)?;
                for fragment in &self.slot(current)?.fragments {
                    if let Some(r) = fragment.intersection(&area) {
                        pairs.push((r, current));
                    }
                }
            }
        }
        Ok(self.emit(&pairs))
    }

    /// Moves an element directly above `target` (or to the top).
    pub fn above(&mut self, id: ElementId, target: Option<ElementId>) -> Result<Vec<Update>> {
        let from = self.zindex(id)?;
        let to = match target {
            Some(target) => {
                let t = self.zindex(target)?;
                if t >= from { t } else { t + 1 }
            }
            None => self.zorder.len() - 1,
        };
        self.reorder(id, to)
    }

    /// Moves an element directly below `target` (or to the bottom).
    pub fn below(&mut self, id: ElementId, target: Option<ElementId>) -> Result<Vec<Update>> {
        let from = self.zindex(id)?;
        let to = match target {
            Some(target) => {
                let t = self.zindex(target)?;
                if t > from { t - 1 } else { t }
            }
            None => 0,
        };
        self.reorder(id, to)
    }

    /// Updates for the parts of the damage `areas` (surface coordinates)
    /// that are visible through the element's fragments.
    ///
    /// This is the path taken after an element's content changed in place.
    pub fn updates_for(&self, id: ElementId, areas: &[Rectangle]) -> Result<Vec<Update>> {
        let slot = self.slot(id)?;
        let mut pairs = vec![];
        for fragment in &slot.fragments {
            for area in areas {
                if let Some(r) = fragment.intersection(area) {
                    pairs.push((r, id));
                }
            }
        }
        Ok(self.emit(&pairs))
    }

    /// The topmost element and fragment containing `position`.
    pub fn find(&self, position: Vector) -> Option<(ElementId, Rectangle)> {
        for &id in self.zorder.iter().rev() {
            if let Ok(slot) = self.slot(id) {
                if let Some(&fragment) = slot.fragments.iter().find(|f| f.contains(position)) {
                    return Some((id, fragment));
                }
            }
        }
        None
    }

    /// The tightest extent enclosing the bottom-right corner of every
    /// element, skipping `exclude` and unbounded (backdrop) elements.
    pub fn min_size(&self, exclude: Option<ElementId>) -> Vector {
        let mut result = Vector::default();
        for &id in &self.zorder {
            if Some(id) == exclude {
                continue;
            }
            let area = self.area_of(id);
            if area.x2 == DIM_HIGH && area.y2 == DIM_HIGH {
                continue;
            }
            result = result.max(area.bottom_right());
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cell::{AttributeMode, SPACE};

    /// A test element: an unbounded backdrop of spaces or a window of one
    /// repeated rune.
    enum Patch {
        Backdrop,
        Block { area: Rectangle, rune: char },
    }

    impl Patch {
        fn block(area: Rectangle, rune: char) -> Self {
            Patch::Block { area, rune }
        }
    }

    impl Element for Patch {
        fn area(&self) -> Rectangle {
            match self {
                Patch::Backdrop => Rectangle::new(0, 0, DIM_HIGH, DIM_HIGH),
                Patch::Block { area, .. } => *area,
            }
        }

        fn text(&self, area: Rectangle) -> Text {
            let rune = match self {
                Patch::Backdrop => ' ',
                Patch::Block { rune, .. } => *rune,
            };
            Text::filled(
                crate::cell::Char::new(rune, SPACE.attrs),
                area.size(),
                AttributeMode::Merge,
            )
        }

        fn reshape(&mut self, new_area: Rectangle) {
            if let Patch::Block { area, .. } = self {
                *area = new_area;
            }
        }
    }

    fn surface() -> Surface<Patch> {
        Surface::with_base(Patch::Backdrop)
    }

    // Wide-integer area, safe for unbounded rectangles.
    fn area_cells(r: &Rectangle) -> i64 {
        (r.x2 as i64 - r.x1 as i64) * (r.y2 as i64 - r.y1 as i64)
    }

    /// Checks the fragment invariant for every element: fragments are
    /// disjoint, lie within the element's area, avoid every area above, and
    /// cover exactly the area minus everything above.
    fn assert_fragments_consistent(surface: &Surface<Patch>) {
        let zorder = surface.zorder();
        for (z, &id) in zorder.iter().enumerate() {
            let area = surface.element(id).unwrap().area();
            let fragments = surface.fragments(id).unwrap();
            for (i, f) in fragments.iter().enumerate() {
                assert_eq!(f.intersection(&area), Some(*f), "fragment {f} outside {area}");
                for g in &fragments[i + 1..] {
                    assert!(!f.intersects(g), "fragments {f} and {g} overlap");
                }
                for &above in &zorder[z + 1..] {
                    let above_area = surface.element(above).unwrap().area();
                    assert!(!f.intersects(&above_area), "fragment {f} under {above_area}");
                }
            }
            // Expected cover: area minus all areas above.
            let mut expected = vec![area];
            for &above in &zorder[z + 1..] {
                let above_area = surface.element(above).unwrap().area();
                let mut next = vec![];
                for r in expected {
                    next.extend(r.default_intersection(&above_area));
                }
                expected = next;
            }
            let total = |list: &[Rectangle]| -> i64 { list.iter().map(area_cells).sum() };
            assert_eq!(total(fragments), total(&expected), "cover mismatch for z {z}");
        }
    }

    fn spaces(width: i16, height: i16) -> Text {
        Text::filled(SPACE, Vector::new(width, height), AttributeMode::Merge)
    }

    fn blocks(width: i16, height: i16, rune: char) -> Text {
        Text::filled(
            crate::cell::Char::new(rune, SPACE.attrs),
            Vector::new(width, height),
            AttributeMode::Merge,
        )
    }

    // Adding one window over the backdrop: the window covers its whole
    // area, the backdrop keeps four fragments around it.
    #[test]
    fn add_one_window() {
        let mut s = surface();
        let (e, updates) = s
            .add_element(Patch::block(Rectangle::new(1, 1, 9, 5), ' '), None)
            .unwrap();

        assert_eq!(s.fragments(e).unwrap(), &[Rectangle::new(1, 1, 9, 5)]);
        assert_eq!(updates, vec![Update::new(Vector::new(1, 1), spaces(8, 4))]);
        assert_eq!(
            s.fragments(s.zorder()[0]).unwrap(),
            &[
                Rectangle::new(0, 0, DIM_HIGH, 1),
                Rectangle::new(0, 1, 1, 5),
                Rectangle::new(9, 1, DIM_HIGH, 5),
                Rectangle::new(0, 5, DIM_HIGH, DIM_HIGH),
            ]
        );
        assert_fragments_consistent(&s);
    }

    // A window slid underneath another shows only its uncovered strips.
    #[test]
    fn add_below_shows_strips_only() {
        let mut s = surface();
        let (e, _) = s
            .add_element(Patch::block(Rectangle::new(1, 1, 9, 5), ' '), None)
            .unwrap();
        let (f, updates) = s
            .add_element(Patch::block(Rectangle::new(2, 0, 8, 6), '.'), Some(e))
            .unwrap();

        assert_eq!(
            s.fragments(f).unwrap(),
            &[Rectangle::new(2, 0, 8, 1), Rectangle::new(2, 5, 8, 6)]
        );
        assert_eq!(s.fragments(e).unwrap(), &[Rectangle::new(1, 1, 9, 5)]);
        assert_eq!(
            updates,
            vec![
                Update::new(Vector::new(2, 0), blocks(6, 1, '.')),
                Update::new(Vector::new(2, 5), blocks(6, 1, '.')),
            ]
        );
        assert_fragments_consistent(&s);
    }

    // Reshaping the lower window sideways repaints what it uncovered and
    // what it newly shows.
    #[test]
    fn reshape_reveals_both_sides() {
        let mut s = surface();
        let (e, _) = s
            .add_element(Patch::block(Rectangle::new(1, 1, 9, 5), ' '), None)
            .unwrap();
        let (f, _) = s
            .add_element(Patch::block(Rectangle::new(2, 0, 8, 6), '.'), Some(e))
            .unwrap();

        let mut updates = s.reshape_element(f, Rectangle::new(4, 0, 10, 6)).unwrap();
        updates.sort_by_key(|u| u.position);

        assert_eq!(
            updates,
            vec![
                Update::new(Vector::new(2, 0), spaces(2, 1)),
                Update::new(Vector::new(2, 5), spaces(2, 1)),
                Update::new(Vector::new(4, 0), blocks(6, 1, '.')),
                Update::new(Vector::new(4, 5), blocks(6, 1, '.')),
                Update::new(Vector::new(9, 1), blocks(1, 4, '.')),
            ]
        );
        assert_eq!(
            s.fragments(f).unwrap(),
            &[
                Rectangle::new(4, 0, 10, 1),
                Rectangle::new(9, 1, 10, 5),
                Rectangle::new(4, 5, 10, 6),
            ]
        );
        assert_fragments_consistent(&s);
    }

    // Deleting a window repaints exactly the strips it occupied.
    #[test]
    fn remove_restores_lower_elements() {
        let mut s = surface();
        let (e, _) = s
            .add_element(Patch::block(Rectangle::new(1, 1, 9, 5), ' '), None)
            .unwrap();
        let (f, _) = s
            .add_element(Patch::block(Rectangle::new(2, 0, 8, 6), '.'), Some(e))
            .unwrap();
        let depth = s.zorder().len();

        let (_, updates) = s.remove_element(f).unwrap();
        assert_eq!(s.zorder().len(), depth - 1);
        assert_eq!(
            updates,
            vec![
                Update::new(Vector::new(2, 0), spaces(6, 1)),
                Update::new(Vector::new(2, 5), spaces(6, 1)),
            ]
        );
        assert_eq!(s.fragments(e).unwrap(), &[Rectangle::new(1, 1, 9, 5)]);
        assert_fragments_consistent(&s);
    }

    #[test]
    fn reshape_to_same_area_emits_nothing() {
        let mut s = surface();
        let (e, _) = s
            .add_element(Patch::block(Rectangle::new(1, 1, 9, 5), ' '), None)
            .unwrap();
        assert!(s.reshape_element(e, Rectangle::new(1, 1, 9, 5)).unwrap().is_empty());
    }

    // Adding and removing a window leaves the stack as it was.
    #[test]
    fn add_then_remove_conserves_structure() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 4, 4), 'a'), None)
            .unwrap();
        let before: Vec<_> = s.zorder().to_vec();
        let fragments_before: Vec<_> = before.iter().map(|&id| s.fragments(id).unwrap().to_vec()).collect();

        let (b, _) = s
            .add_element(Patch::block(Rectangle::new(2, 2, 6, 6), 'b'), None)
            .unwrap();
        s.remove_element(b).unwrap();

        assert_eq!(s.zorder(), &before[..]);
        let fragments_after: Vec<_> = before.iter().map(|&id| s.fragments(id).unwrap().to_vec()).collect();
        assert_eq!(fragments_before, fragments_after);
        assert_eq!(s.fragments(a).unwrap(), &[Rectangle::new(0, 0, 4, 4)]);
        assert_fragments_consistent(&s);
    }

    // Using a stale handle is a programming error: fatal under debug
    // assertions, a typed error in release builds.
    #[test]
    #[cfg_attr(debug_assertions, should_panic(expected = "not present in surface"))]
    fn stale_handle_is_fatal_in_debug() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 2, 2), 'a'), None)
            .unwrap();
        s.remove_element(a).unwrap();
        let _ = s.remove_element(a);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn stale_handle_is_an_invariant_violation() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 2, 2), 'a'), None)
            .unwrap();
        s.remove_element(a).unwrap();
        assert!(matches!(s.remove_element(a), Err(Error::InvariantViolation(_))));
        assert!(matches!(
            s.reshape_element(a, Rectangle::new(0, 0, 3, 3)),
            Err(Error::InvariantViolation(_))
        ));
    }

    #[test]
    fn above_raises_and_repaints_overlap() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 4, 4), 'a'), None)
            .unwrap();
        let (b, _) = s
            .add_element(Patch::block(Rectangle::new(2, 2, 6, 6), 'b'), None)
            .unwrap();

        // Raise a over b: the whole of a is visible again.
        let updates = s.above(a, None).unwrap();
        assert_eq!(s.zorder().last(), Some(&a));
        assert_eq!(s.fragments(a).unwrap(), &[Rectangle::new(0, 0, 4, 4)]);
        assert_eq!(updates, vec![Update::new(Vector::new(0, 0), blocks(4, 4, 'a'))]);
        assert_fragments_consistent(&s);

        // And back below: the overlap shows b again.
        let updates = s.below(a, Some(b)).unwrap();
        assert!(
            updates
                .iter()
                .any(|u| u.position == Vector::new(2, 2) && u.text == blocks(2, 2, 'b'))
        );
        assert_fragments_consistent(&s);
    }

    #[test]
    fn reorder_to_same_position_emits_nothing() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 4, 4), 'a'), None)
            .unwrap();
        assert!(s.above(a, None).unwrap().is_empty());
    }

    #[test]
    fn updates_for_clips_damage_through_fragments() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 6, 4), 'a'), None)
            .unwrap();
        let (_b, _) = s
            .add_element(Patch::block(Rectangle::new(4, 0, 8, 4), 'b'), None)
            .unwrap();

        // Damage across a's area: only the visible part (left of b) shows.
        let updates = s.updates_for(a, &[Rectangle::new(2, 1, 6, 2)]).unwrap();
        assert_eq!(updates, vec![Update::new(Vector::new(2, 1), blocks(2, 1, 'a'))]);
    }

    #[test]
    fn find_reports_topmost_fragment() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 6, 4), 'a'), None)
            .unwrap();
        let (b, _) = s
            .add_element(Patch::block(Rectangle::new(4, 0, 8, 4), 'b'), None)
            .unwrap();

        assert_eq!(s.find(Vector::new(5, 1)).map(|(id, _)| id), Some(b));
        assert_eq!(s.find(Vector::new(1, 1)).map(|(id, _)| id), Some(a));
        // Outside both, the backdrop answers.
        assert_eq!(s.find(Vector::new(100, 100)).map(|(id, _)| id), Some(s.zorder()[0]));
    }

    #[test]
    fn min_size_skips_backdrop_and_exclusion() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 6, 4), 'a'), None)
            .unwrap();
        let (b, _) = s
            .add_element(Patch::block(Rectangle::new(2, 2, 4, 9), 'b'), None)
            .unwrap();

        assert_eq!(s.min_size(None), Vector::new(6, 9));
        assert_eq!(s.min_size(Some(b)), Vector::new(6, 4));
        assert_eq!(s.min_size(Some(a)), Vector::new(4, 9));
    }

    // Fragment invariant across a randomized-ish sequence of operations.
    #[test]
    fn fragment_invariant_over_mixed_operations() {
        let mut s = surface();
        let (a, _) = s
            .add_element(Patch::block(Rectangle::new(0, 0, 10, 6), 'a'), None)
            .unwrap();
        let (b, _) = s
            .add_element(Patch::block(Rectangle::new(5, 3, 14, 9), 'b'), None)
            .unwrap();
        let (c, _) = s
            .add_element(Patch::block(Rectangle::new(2, 2, 7, 11), 'c'), Some(b))
            .unwrap();
        assert_fragments_consistent(&s);

        s.reshape_element(c, Rectangle::new(1, 1, 8, 7)).unwrap();
        assert_fragments_consistent(&s);

        s.above(a, None).unwrap();
        assert_fragments_consistent(&s);

        s.below(b, Some(c)).unwrap();
        assert_fragments_consistent(&s);

        s.remove_element(c).unwrap();
        assert_fragments_consistent(&s);

        s.reshape_element(b, Rectangle::new(0, 0, 3, 3)).unwrap();
        assert_fragments_consistent(&s);

        s.remove_element(b).unwrap();
        s.remove_element(a).unwrap();
        assert_fragments_consistent(&s);
    }
}
