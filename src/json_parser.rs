/*

    Provide utilities to parse run configuration JSON files.

    The parser is somewhat lenient, let <a> be integer or float type,
    in the JSON file <a> can be given both in quotes (string) or as is.

    e.g. In JSON file both
    "MaxDepth": "6" and "MaxDepth": 6
    works as max_depth: usize in source code

    Vectors can be given either as "<a> <a> <a>" or as [<a>, <a>, <a>].

    @date: 2 Oct, 2025
    @author: bartu
*/

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer};

use crate::config::RunConfig;
use crate::prelude::*;

pub fn parse_config(path: &str) -> Result<RunConfig> {

    let span = tracing::span!(tracing::Level::INFO, "load_config");
    let _enter = span.enter();

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    debug!("Reading config from {}", path);

    let config: RunConfig = serde_json::from_reader(reader)?;
    config.index.validate()?;
    Ok(config)
}

pub fn parse_config_str(json: &str) -> Result<RunConfig> {
    let config: RunConfig = serde_json::from_str(json)?;
    config.index.validate()?;
    Ok(config)
}

pub(crate) fn deser_usize<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    /*
        Deserialize usize type given as either string or number in JSON
    */
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_u64()
            .map(|v| v as usize)
            .ok_or_else(|| de::Error::custom("Invalid unsigned integer")),
        serde_json::Value::String(s) => s.trim().parse::<usize>()
            .map_err(|_| de::Error::custom("Failed to parse integer from string")),
        t => Err(de::Error::custom(format!("Expected int or string, found {t}"))),
    }
}

// Handles floats as string or number
pub(crate) fn deser_float<'de, D>(deserializer: D) -> std::result::Result<Float, D::Error>
where
    D: Deserializer<'de>,
{
    let s: serde_json::Value = Deserialize::deserialize(deserializer)?;
    match s {
        serde_json::Value::Number(n) => n.as_f64()
            .map(|v| v as Float)
            .ok_or_else(|| de::Error::custom("Invalid float")),
        serde_json::Value::String(s) => s.trim().parse::<Float>()
            .map_err(|_| de::Error::custom("Failed to parse float from string")),
        t => Err(de::Error::custom(format!("Expected float or string, found {t}"))),
    }
}

/// Parse exactly N whitespace separated values.
pub fn parse_components<T, const N: usize>(value: &str) -> std::result::Result<[T; N], String>
where
    T: FromStr + Copy + Default,
    T::Err: fmt::Display,
{
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != N {
        return Err(format!("Expected {} components, found {} in '{}'", N, parts.len(), value));
    }
    let mut out = [T::default(); N];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part.parse::<T>().map_err(|e| format!("Failed parsing '{part}': {e}"))?;
    }
    Ok(out)
}

/// Deserialize N values given as "a b c" or [a, b, c].
pub(crate) fn deser_array<'de, D, T, const N: usize>(deserializer: D) -> std::result::Result<[T; N], D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr + Copy + Default,
    T::Err: fmt::Display,
{
    struct ArrayVisitor<T, const N: usize>(PhantomData<T>);

    impl<'de, T, const N: usize> Visitor<'de> for ArrayVisitor<T, N>
    where
        T: Deserialize<'de> + FromStr + Copy + Default,
        T::Err: fmt::Display,
    {
        type Value = [T; N];

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            write!(formatter, "an array of {N} numbers or a string of {N} numbers")
        }

        fn visit_str<E>(self, value: &str) -> std::result::Result<[T; N], E>
        where
            E: de::Error,
        {
            parse_components::<T, N>(value).map_err(E::custom)
        }

        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<[T; N], A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut out = [T::default(); N];
            for slot in out.iter_mut() {
                *slot = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::custom(format!("expected {N} elements")))?;
            }
            if seq.next_element::<T>()?.is_some() {
                return Err(de::Error::custom(format!("expected only {N} elements")));
            }
            Ok(out)
        }
    }

    deserializer.deserialize_any(ArrayVisitor::<T, N>(PhantomData))
}

pub(crate) fn deser_vec3<'de, D>(deserializer: D) -> std::result::Result<Vector3, D::Error>
where
    D: Deserializer<'de>,
{
    let [x, y, z] = deser_array::<D, Float, 3>(deserializer)?;
    Ok(Vector3::new(x, y, z))
}

pub(crate) fn deser_pair<'de, D>(deserializer: D) -> std::result::Result<[usize; 2], D::Error>
where
    D: Deserializer<'de>,
{
    deser_array::<D, usize, 2>(deserializer)
}

pub(crate) fn deser_float4<'de, D>(deserializer: D) -> std::result::Result<[Float; 4], D::Error>
where
    D: Deserializer<'de>,
{
    deser_array::<D, Float, 4>(deserializer)
}
