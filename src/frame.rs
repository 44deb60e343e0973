pub mod frames;
use std::{
    fmt,
    marker::PhantomData,
    ops::{Deref, DerefMut},
};

pub use frames::*;

/// A value tagged with the reference frame it is expressed in.
///
/// The frame is a zero-sized marker, so a sweep-start point and a sweep-end
/// point have different types even though they share a representation.
pub struct Framed<T, F> {
    inner: T,
    frame: PhantomData<F>,
}

impl<T: Clone, F> Clone for Framed<T, F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            frame: PhantomData,
        }
    }
}

impl<T: Default, F> Default for Framed<T, F> {
    fn default() -> Self {
        Self {
            inner: Default::default(),
            frame: PhantomData,
        }
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Framed<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Framed")
            .field("frame", &std::any::type_name::<F>())
            .field("inner", &self.inner)
            .finish()
    }
}

impl<T: PartialEq, F> PartialEq for Framed<T, F> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T, F> Framed<T, F> {
    pub const fn new(inner: T) -> Self {
        Self {
            inner,
            frame: PhantomData,
        }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T> Framed<T, Lidar> {
    /// Take raw data as expressed at the sweep start. Used on the first sweep,
    /// when no motion estimate exists to compensate with.
    pub fn into_sweep_start(self) -> Framed<T, SweepStart> {
        Framed::new(self.inner)
    }
}

impl<T> Framed<T, SweepEnd> {
    /// The end of one sweep is the start of the next, so data reprojected to
    /// the end of this sweep is the reference for the following one.
    pub fn into_next_sweep_start(self) -> Framed<T, SweepStart> {
        Framed::new(self.inner)
    }
}

impl<T, F> Deref for Framed<T, F> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T, F> DerefMut for Framed<T, F> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<T, F, A> FromIterator<A> for Framed<T, F>
where
    T: FromIterator<A>,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = A>,
    {
        Self::new(iter.into_iter().collect())
    }
}

impl<T, F, A> Extend<A> for Framed<T, F>
where
    T: Extend<A>,
{
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = A>,
    {
        self.inner.extend(iter)
    }
}
