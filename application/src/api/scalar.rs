//! GraphQL scalar definitions.

use std::{any, fmt, marker::PhantomData, str::FromStr};

use juniper::{
    GraphQLType, InputValue, ParseScalarResult, ParseScalarValue, ScalarToken,
    ScalarValue, Value,
};

/// Returns the GraphQL name of the `T` type, falling back to its Rust name.
fn name_of<T, S>() -> String
where
    T: GraphQLType<S, TypeInfo = ()>,
    S: ScalarValue,
{
    T::name(&()).map_or_else(|| any::type_name::<T>().to_owned(), Into::into)
}

/// Helper type to use in `#[graphql(with = ..)]` attribute for string
/// scalars.
///
/// Uses [`FromStr`]/[`Display`] impls of `As` type to convert the target type
/// to/from GraphQL scalar, so the validation of `As` applies to the input.
///
/// Target type must implement [`TryFrom`] and [`AsRef`] for `As` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<As>(PhantomData<As>);

impl<As> Via<As> {
    /// Converts the target type into scalar [`Value`] by using [`Display`]
    /// impl of `As` type.
    ///
    /// [`Display`]: fmt::Display
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: fmt::Display,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::from(value.as_ref().to_string())
    }

    /// Constructs the target type from scalar [`Value`] by using [`FromStr`]
    /// impl of `As` type.
    ///
    /// # Errors
    ///
    /// If the input is not a string or isn't a valid `As` value.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: FromStr,
        As::Err: fmt::Display,
        T: TryFrom<As> + GraphQLType<S, TypeInfo = ()>,
        T::Error: fmt::Display,
        S: ScalarValue,
    {
        let s = input.as_string_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{}`: expected string input \
                 value, found: {input}",
                name_of::<T, S>(),
            )
        })?;
        s.parse::<As>()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{}` from \"{s}\" string: {e}",
                    name_of::<T, S>(),
                )
            })?
            .try_into()
            .map_err(|e| {
                format!(
                    "Cannot parse input scalar `{}`: {e}",
                    name_of::<T, S>(),
                )
            })
    }

    /// Parses the provided [`ScalarToken`] as a [`String`].
    ///
    /// # Errors
    ///
    /// If the token is not a string.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

/// Helper type to use in `#[graphql(with = ..)]` attribute for integer
/// scalars backed by a narrower `As` integer than GraphQL `Int`.
///
/// Out of range input is rejected instead of being truncated.
#[derive(Debug)]
pub struct Int<As>(PhantomData<As>);

impl<As> Int<As> {
    /// Converts the target type into `Int` scalar [`Value`].
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        As: Copy + Into<i32>,
        T: AsRef<As>,
        S: ScalarValue,
    {
        Value::scalar((*value.as_ref()).into())
    }

    /// Constructs the target type from `Int` scalar [`Value`].
    ///
    /// # Errors
    ///
    /// If the input is not an integer or doesn't fit into `As` type.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        As: TryFrom<i32>,
        T: From<As> + GraphQLType<S, TypeInfo = ()>,
        S: ScalarValue,
    {
        let n = input.as_int_value().ok_or_else(|| {
            format!(
                "Cannot parse input scalar `{}`: expected integer input \
                 value, found: {input}",
                name_of::<T, S>(),
            )
        })?;
        As::try_from(n).map(T::from).map_err(|_| {
            format!(
                "Cannot parse input scalar `{}`: `{n}` is out of range",
                name_of::<T, S>(),
            )
        })
    }

    /// Parses the provided [`ScalarToken`] as an [`i32`].
    ///
    /// # Errors
    ///
    /// If the token is not an integer.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <i32 as ParseScalarValue<S>>::from_str(value)
    }
}
