//! SELECT builder states.
//!
//! Each marker names the last clause added. The traits below say which
//! clauses may follow; a method missing from a state simply does not exist
//! on that state's statement type.

/// Fields chosen, FROM not yet given (inferred from the fields).
#[derive(Debug, Clone, Copy)]
pub struct Fields;
/// FROM given.
#[derive(Debug, Clone, Copy)]
pub struct Tables;
/// A join was added and still needs its `ON` condition.
#[derive(Debug, Clone, Copy)]
pub struct Joining;
/// A join condition was given.
#[derive(Debug, Clone, Copy)]
pub struct Joined;
#[derive(Debug, Clone, Copy)]
pub struct Where;
#[derive(Debug, Clone, Copy)]
pub struct GroupBy;
#[derive(Debug, Clone, Copy)]
pub struct Having;
#[derive(Debug, Clone, Copy)]
pub struct Order;
#[derive(Debug, Clone, Copy)]
pub struct Limit;
#[derive(Debug, Clone, Copy)]
pub struct Offset;
#[derive(Debug, Clone, Copy)]
pub struct Locked;

mod sealed {
    pub trait Sealed {}
}

macro_rules! states {
    ($trait:ident: $($state:ident),+) => {
        $(impl $trait for $state {})+
    };
}

impl sealed::Sealed for Fields {}
impl sealed::Sealed for Tables {}
impl sealed::Sealed for Joining {}
impl sealed::Sealed for Joined {}
impl sealed::Sealed for Where {}
impl sealed::Sealed for GroupBy {}
impl sealed::Sealed for Having {}
impl sealed::Sealed for Order {}
impl sealed::Sealed for Limit {}
impl sealed::Sealed for Offset {}
impl sealed::Sealed for Locked {}

/// States that accept `join`, `left_join` and `right_join`.
pub trait Joinable: sealed::Sealed {}
/// States that accept `where_`.
pub trait Filterable: sealed::Sealed {}
/// States that accept `group_by`.
pub trait Groupable: sealed::Sealed {}
/// States that accept `order_by`.
pub trait Orderable: sealed::Sealed {}
/// States that accept `limit`.
pub trait Limitable: sealed::Sealed {}
/// States that accept `lock_in_share_mode` and `for_update`.
pub trait Lockable: sealed::Sealed {}
/// States that may start another UNION branch.
pub trait Unionable: sealed::Sealed {}
/// States that render and execute.
pub trait Complete: sealed::Sealed + Send + Sync {}

states!(Joinable: Tables, Joined);
states!(Filterable: Fields, Tables, Joined);
states!(Groupable: Fields, Tables, Joined, Where);
states!(Orderable: Fields, Tables, Joined, Where, GroupBy, Having);
states!(Limitable: Fields, Tables, Joined, Where, GroupBy, Having, Order);
states!(Lockable: Fields, Tables, Joined, Where, GroupBy, Having, Order, Limit, Offset);
states!(Unionable: Fields, Tables, Joined, Where, GroupBy, Having);
states!(Complete: Fields, Tables, Joined, Where, GroupBy, Having, Order, Limit, Offset, Locked);
