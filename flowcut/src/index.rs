use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::num::NonZeroUsize;
use std::ops::{Deref, DerefMut, Index, IndexMut};

use rustc_hash::FxBuildHasher;

// Ids for environment states, automaton states, graph nodes and edges and
// program variables are all declared with `new_index!`, so they cannot be mixed up.

/// A `Vec` whose positions are addressed by a typed id instead of a bare `usize`.
#[derive(Clone, PartialEq)]
pub struct IndexedVec<I, T> {
    vec: Vec<T>,
    _marker: PhantomData<I>,
}

impl<I, T> Deref for IndexedVec<I, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Self::Target {
        &self.vec
    }
}

impl<I, T> DerefMut for IndexedVec<I, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.vec
    }
}

impl<I: AsIndex, T> IndexedVec<I, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: T) -> I {
        let index = I::from_usize(self.len());
        self.vec.push(value);
        index
    }

    pub fn indexes(&self) -> impl Iterator<Item = I> + DoubleEndedIterator + ExactSizeIterator {
        (0..self.len()).map(I::from_usize)
    }

    pub fn enumerate(
        &self,
    ) -> impl Iterator<Item = (I, &T)> + DoubleEndedIterator + ExactSizeIterator {
        self.vec.iter().enumerate().map(|(i, t)| (I::from_usize(i), t))
    }
}

impl<I, T: fmt::Debug> fmt::Debug for IndexedVec<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.vec, f)
    }
}

impl<I, T> Default for IndexedVec<I, T> {
    fn default() -> Self {
        Vec::new().into()
    }
}

impl<I: AsIndex, T> Index<I> for IndexedVec<I, T> {
    type Output = T;

    fn index(&self, index: I) -> &Self::Output {
        &self.vec[index.to_usize()]
    }
}

impl<I: AsIndex, T> IndexMut<I> for IndexedVec<I, T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.vec[index.to_usize()]
    }
}

impl<I, T> From<Vec<T>> for IndexedVec<I, T> {
    fn from(value: Vec<T>) -> Self {
        Self { vec: value, _marker: PhantomData }
    }
}

impl<I, T> FromIterator<T> for IndexedVec<I, T> {
    fn from_iter<IT: IntoIterator<Item = T>>(iter: IT) -> Self {
        Vec::from_iter(iter).into()
    }
}

/// An insertion ordered set that hands out a typed id for each distinct value.
#[derive(Clone)]
pub struct IndexedSet<I, T> {
    set: indexmap::IndexSet<T, FxBuildHasher>,
    _marker: PhantomData<I>,
}

impl<I, T> Default for IndexedSet<I, T> {
    fn default() -> Self {
        Self { set: Default::default(), _marker: PhantomData }
    }
}

impl<I: AsIndex, T: Hash + Eq> IndexedSet<I, T> {
    pub fn insert_full(&mut self, value: T) -> (I, bool) {
        let (idx, is_new) = self.set.insert_full(value);
        (I::from_usize(idx), is_new)
    }

    pub fn get_index_of<Q>(&self, value: &Q) -> Option<I>
    where
        Q: indexmap::Equivalent<T> + Hash + ?Sized,
    {
        Some(I::from_usize(self.set.get_index_of(value)?))
    }

    pub fn indexes(&self) -> impl Iterator<Item = I> + DoubleEndedIterator + ExactSizeIterator {
        (0..self.len()).map(I::from_usize)
    }

    pub fn enumerate(&self) -> impl Iterator<Item = (I, &T)> + DoubleEndedIterator {
        self.set.iter().enumerate().map(|(i, t)| (I::from_usize(i), t))
    }
}

impl<I, T> Deref for IndexedSet<I, T> {
    type Target = indexmap::IndexSet<T, FxBuildHasher>;

    fn deref(&self) -> &Self::Target {
        &self.set
    }
}

impl<I, T: fmt::Debug> fmt::Debug for IndexedSet<I, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.set, f)
    }
}

impl<I: AsIndex, T> Index<I> for IndexedSet<I, T> {
    type Output = T;

    fn index(&self, index: I) -> &Self::Output {
        &self.set[index.to_usize()]
    }
}

impl<I, T: Hash + Eq> FromIterator<T> for IndexedSet<I, T> {
    fn from_iter<IT: IntoIterator<Item = T>>(iter: IT) -> Self {
        Self { set: indexmap::IndexSet::from_iter(iter), _marker: PhantomData }
    }
}

pub trait AsIndex: Copy {
    fn to_usize(&self) -> usize;
    fn from_usize(index: usize) -> Self;
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NonMaxUsize(NonZeroUsize);

impl NonMaxUsize {
    pub const fn new(n: usize) -> Self {
        match NonZeroUsize::new(n.wrapping_add(1)) {
            Some(n) => Self(n),
            None => panic!("index overflow"),
        }
    }

    pub const fn to_usize(self) -> usize {
        self.0.get() - 1
    }
}

impl Default for NonMaxUsize {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Debug for NonMaxUsize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_usize(), f)
    }
}

#[macro_export]
macro_rules! new_index {
    ($(#[$($meta:tt)*])* $vis:vis index $ty:ident) => {
        $(#[$($meta)*])*
        #[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis struct $ty { index: $crate::index::NonMaxUsize }

        #[allow(non_snake_case)]
        $vis const fn $ty(index: usize) -> $ty {
            $ty { index: $crate::index::NonMaxUsize::new(index) }
        }

        impl $crate::index::AsIndex for $ty {
            fn to_usize(&self) -> usize {
                self.index.to_usize()
            }

            fn from_usize(index: usize) -> Self {
                $ty(index)
            }
        }

        impl ::std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                write!(f, "{}({})", stringify!($ty), self.index.to_usize())
            }
        }

        impl ::std::fmt::Display for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::fmt::Display::fmt(&self.index.to_usize(), f)
            }
        }
    };
}
