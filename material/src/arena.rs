use geometry::ray::Segment;
use light::LightInfo;
use math::hcm::Vec3;
use radiometry::color::Color;
use shape::Hit;

use std::marker::PhantomData;

use crate::ShadeStats;

/// A free-list of reusable values of one type.
///
/// `acquire()` hands out a recycled value if there is one and only allocates when the list is
/// empty; `release()` gives the value back. After warming up, a render does not allocate scratch
/// values per ray.
#[derive(Debug)]
pub struct Pool<T> {
    free: Vec<T>,
    created: usize,
    outstanding: usize,
}

impl<T> Default for Pool<T> {
    fn default() -> Self {
        Pool {
            free: vec![],
            created: 0,
            outstanding: 0,
        }
    }
}

impl<T: Default> Pool<T> {
    pub fn acquire(&mut self) -> T {
        self.outstanding += 1;
        match self.free.pop() {
            Some(item) => item,
            None => {
                self.created += 1;
                T::default()
            }
        }
    }

    pub fn release(&mut self, item: T) {
        debug_assert!(self.outstanding > 0, "released more than acquired");
        self.outstanding = self.outstanding.saturating_sub(1);
        self.free.push(item);
    }

    /// Number of values ever allocated by this pool.
    pub fn created(&self) -> usize {
        self.created
    }

    /// Number of values acquired but not yet released.
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }
}

/// Values that live in one of the arena's pools.
pub trait Scratch<'s>: Default + Sized {
    fn pool<'a>(arena: &'a mut Arena<'s>) -> &'a mut Pool<Self>;

    /// Brings a recycled value back to its initial state.
    fn recycle(&mut self);
}

/// Per-worker scratch storage: one pool per scratch type, plus the worker's shading counters.
///
/// An arena is never shared between threads; each rendering worker owns one. It borrows nothing
/// but is tied to the surfaces (`'s`) that the pooled hit records point to.
#[derive(Default)]
pub struct Arena<'s> {
    hits: Pool<Hit<'s>>,
    light_infos: Pool<LightInfo>,
    segments: Pool<Segment>,
    vectors: Pool<Vec3>,
    colors: Pool<Color>,
    pub stats: ShadeStats,
}

impl<'s> Arena<'s> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a value of type `T` out of its pool, already reset.
    pub fn acquire<T: Scratch<'s>>(&mut self) -> T {
        let mut item = T::pool(self).acquire();
        item.recycle();
        item
    }

    pub fn release<T: Scratch<'s>>(&mut self, item: T) {
        T::pool(self).release(item)
    }

    /// Runs `f` with a scratch value that goes back to the pool however `f` exits, unwinding
    /// included.
    /// ```
    /// use material::Arena;
    /// use radiometry::color::Color;
    /// let mut arena = Arena::new();
    /// let sum = arena.scoped(|_, c: &mut Color| {
    ///     *c += Color::gray(0.25);
    ///     *c += Color::gray(0.25);
    ///     *c
    /// });
    /// assert_eq!(sum, Color::gray(0.5));
    /// assert_eq!(arena.outstanding(), 0);
    /// ```
    pub fn scoped<T: Scratch<'s>, R>(&mut self, f: impl FnOnce(&mut Self, &mut T) -> R) -> R {
        with_scratch(self, f)
    }

    /// Total scratch values acquired and not yet released, across all pools.
    pub fn outstanding(&self) -> usize {
        self.hits.outstanding()
            + self.light_infos.outstanding()
            + self.segments.outstanding()
            + self.vectors.outstanding()
            + self.colors.outstanding()
    }

    /// Total scratch values ever allocated, across all pools.
    pub fn created(&self) -> usize {
        self.hits.created()
            + self.light_infos.created()
            + self.segments.created()
            + self.vectors.created()
            + self.colors.created()
    }
}

/// Owners of a worker arena that hand scratch values to closures.
pub(crate) trait ArenaOwner<'s> {
    fn arena(&mut self) -> &mut Arena<'s>;
}

impl<'s> ArenaOwner<'s> for Arena<'s> {
    fn arena(&mut self) -> &mut Arena<'s> {
        self
    }
}

/// A scratch value on loan from `owner`'s arena. Dropping the lease returns the value.
struct Lease<'g, 's, O: ArenaOwner<'s>, T: Scratch<'s>> {
    owner: &'g mut O,
    item: T,
    arena: PhantomData<&'g Arena<'s>>,
}

impl<'g, 's, O: ArenaOwner<'s>, T: Scratch<'s>> Drop for Lease<'g, 's, O, T> {
    fn drop(&mut self) {
        let item = std::mem::take(&mut self.item);
        self.owner.arena().release(item);
    }
}

pub(crate) fn with_scratch<'s, O, T, R>(owner: &mut O, f: impl FnOnce(&mut O, &mut T) -> R) -> R
where
    O: ArenaOwner<'s>,
    T: Scratch<'s>,
{
    let item = owner.arena().acquire::<T>();
    let mut lease = Lease {
        owner,
        item,
        arena: PhantomData,
    };
    let out = f(&mut *lease.owner, &mut lease.item);
    drop(lease);
    out
}

impl<'s> Scratch<'s> for Hit<'s> {
    fn pool<'a>(arena: &'a mut Arena<'s>) -> &'a mut Pool<Self> {
        &mut arena.hits
    }
    fn recycle(&mut self) {
        self.reset();
    }
}

impl<'s> Scratch<'s> for LightInfo {
    fn pool<'a>(arena: &'a mut Arena<'s>) -> &'a mut Pool<Self> {
        &mut arena.light_infos
    }
    fn recycle(&mut self) {
        *self = LightInfo::default();
    }
}

impl<'s> Scratch<'s> for Segment {
    fn pool<'a>(arena: &'a mut Arena<'s>) -> &'a mut Pool<Self> {
        &mut arena.segments
    }
    fn recycle(&mut self) {
        *self = Segment::default();
    }
}

impl<'s> Scratch<'s> for Vec3 {
    fn pool<'a>(arena: &'a mut Arena<'s>) -> &'a mut Pool<Self> {
        &mut arena.vectors
    }
    fn recycle(&mut self) {
        *self = Vec3::ZERO;
    }
}

impl<'s> Scratch<'s> for Color {
    fn pool<'a>(arena: &'a mut Arena<'s>) -> &'a mut Pool<Self> {
        &mut arena.colors
    }
    fn recycle(&mut self) {
        *self = Color::black();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn pool_reuses_released_values() {
        let mut pool = Pool::<Vec3>::default();
        let a = pool.acquire();
        let b = pool.acquire();
        assert_eq!(pool.created(), 2);
        assert_eq!(pool.outstanding(), 2);
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.outstanding(), 0);
        let _c = pool.acquire();
        assert_eq!(pool.created(), 2);
        assert_eq!(pool.outstanding(), 1);
    }

    #[test]
    fn recycled_values_are_reset() {
        let mut arena = Arena::new();
        arena.scoped(|_, hit: &mut Hit| {
            hit.distance = 3.0;
            hit.max_contribution = 0.1;
        });
        arena.scoped(|_, v: &mut Vec3| *v = Vec3::X);
        arena.scoped(|arena, hit: &mut Hit| {
            assert!(!hit.is_hit());
            assert_eq!(hit.max_contribution, 1.0);
            arena.scoped(|_, v: &mut Vec3| assert_eq!(*v, Vec3::ZERO));
        });
        assert_eq!(arena.outstanding(), 0);
        assert_eq!(arena.created(), 2);
    }

    #[test]
    fn nested_scopes_allocate_separately() {
        let mut arena = Arena::new();
        let depth = arena.scoped(|arena, outer: &mut Color| {
            *outer = Color::ONE;
            arena.scoped(|arena, inner: &mut Color| {
                assert!(inner.is_black());
                assert_eq!(arena.outstanding(), 2);
                2
            })
        });
        assert_eq!(depth, 2);
        assert_eq!(arena.outstanding(), 0);
        assert_eq!(arena.created(), 2);
    }

    #[test]
    fn unwinding_scope_releases() {
        let mut arena = Arena::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            arena.scoped(|arena, _: &mut Hit| {
                arena.scoped(|_, _: &mut Color| panic!("shader failed"));
            })
        }));
        assert!(result.is_err());
        assert_eq!(arena.outstanding(), 0);
        assert_eq!(arena.created(), 2);
    }
}
