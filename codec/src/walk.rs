//! Whole-tree encode and decode over [`Value`].
//!
//! [`pack_value`] drives a [`Packer`] from a value tree; [`unpack_value`]
//! rebuilds a tree from bytes, resolving back-references and explicit
//! array indexes, with [`Limits`] bounding depth and sparse-array fill.

use wire::{TAG_EOS, TAG_IDX};

use crate::error::{PackError, PackResult, Role, UnpackError, UnpackResult};
use crate::limits::Limits;
use crate::pack::Packer;
use crate::unpack::{Extract, KeyExtract, Unpacker};
use crate::value::Value;

/// Encodes a value tree through `packer`.
///
/// Arrays are encoded densely in element order; maps in pair order. Map
/// keys must be integers or strings, anything else is
/// [`PackError::InvalidMapKey`].
pub fn pack_value(packer: &mut Packer<'_>, value: &Value) -> PackResult<()> {
    match value {
        Value::Nil => packer.pack_nil(),
        Value::Bool(v) => packer.pack_bool(*v),
        Value::Int(v) => packer.pack_int(*v),
        Value::Uint(v) => packer.pack_uint(*v),
        Value::F32(v) => packer.pack_f32(*v),
        Value::F64(v) => packer.pack_f64(*v),
        Value::Str(bytes) => packer.pack_str(bytes),
        Value::Raw(bytes) => packer.pack_raw(bytes),
        Value::Arr(items) => {
            packer.pack_array(items.len() as u64)?;
            for item in items {
                pack_value(packer, item)?;
            }
            Ok(())
        }
        Value::Map(pairs) => {
            packer.pack_map(pairs.len() as u64)?;
            for (key, val) in pairs {
                if !key.is_key_kind() {
                    return Err(PackError::InvalidMapKey { kind: key.kind() });
                }
                pack_value(packer, key)?;
                pack_value(packer, val)?;
            }
            Ok(())
        }
        Value::Set(items) => {
            packer.pack_set(items.len() as u64)?;
            for item in items {
                pack_value(packer, item)?;
            }
            Ok(())
        }
    }
}

/// Encodes a value tree into a fresh byte vector.
pub fn pack_to_vec(value: &Value) -> PackResult<Vec<u8>> {
    let mut packer = Packer::new()?;
    pack_value(&mut packer, value)?;
    packer.finish()
}

/// Decodes the value tree at the start of `data` with default limits.
pub fn unpack_value(data: &[u8]) -> UnpackResult<Value> {
    unpack_value_with_limits(data, &Limits::default())
}

/// Decodes the value tree at the start of `data`.
///
/// Back-references are followed through a positioned sub-decoder; a
/// reference must target an offset strictly before its own tag, which
/// together with the depth limit bounds the decode. Every produced value
/// is counted against `max_total_nodes`, so a small input cannot expand
/// into an arbitrarily large tree through repeated references.
pub fn unpack_value_with_limits(data: &[u8], limits: &Limits) -> UnpackResult<Value> {
    let mut unpacker = Unpacker::new(data);
    let mut nodes = 0;
    extract_value(&mut unpacker, limits, 0, &mut nodes)
}

/// Allocation hint for a declared container length. Hostile input can
/// declare any length, so the hint is capped and vectors grow from there.
fn cap_hint(declared: Option<u64>) -> usize {
    declared.map_or(0, |len| len.min(1024) as usize)
}

fn extract_value(
    u: &mut Unpacker<'_>,
    limits: &Limits,
    depth: usize,
    nodes: &mut usize,
) -> UnpackResult<Value> {
    let tag_pos = u.position();
    match u.next()? {
        Some(item) => extract_from(u, item, tag_pos, limits, depth, nodes),
        None => Err(UnpackError::UnexpectedEnd),
    }
}

fn extract_from(
    u: &mut Unpacker<'_>,
    item: Extract<'_>,
    tag_pos: usize,
    limits: &Limits,
    depth: usize,
    nodes: &mut usize,
) -> UnpackResult<Value> {
    charge_nodes(limits, nodes, 1)?;
    match item {
        Extract::Nil => Ok(Value::Nil),
        Extract::Bool(v) => Ok(Value::Bool(v)),
        Extract::Int(v) => Ok(Value::Int(v)),
        Extract::Uint(v) => Ok(Value::Uint(v)),
        Extract::Nan => Ok(Value::F64(f64::NAN)),
        Extract::NegInf => Ok(Value::F64(f64::NEG_INFINITY)),
        Extract::PosInf => Ok(Value::F64(f64::INFINITY)),
        Extract::F32(v) => Ok(Value::F32(v)),
        Extract::F64(v) => Ok(Value::F64(v)),
        Extract::Str(bytes) => Ok(Value::Str(bytes.to_vec())),
        Extract::Raw(bytes) => Ok(Value::Raw(bytes.to_vec())),
        Extract::Arr { len } => {
            check_depth(limits, depth)?;
            decode_array(u, Some(len), limits, depth + 1, nodes)
        }
        Extract::StreamArr => {
            check_depth(limits, depth)?;
            decode_array(u, None, limits, depth + 1, nodes)
        }
        Extract::Map { len } => {
            check_depth(limits, depth)?;
            decode_map(u, Some(len), limits, depth + 1, nodes)
        }
        Extract::StreamMap => {
            check_depth(limits, depth)?;
            decode_map(u, None, limits, depth + 1, nodes)
        }
        Extract::Set { len } => {
            check_depth(limits, depth)?;
            decode_set(u, Some(len), limits, depth + 1, nodes)
        }
        Extract::StreamSet => {
            check_depth(limits, depth)?;
            decode_set(u, None, limits, depth + 1, nodes)
        }
        Extract::Ref { offset } => {
            // Strictly backwards, so every chain of references descends
            // toward offset zero and the depth limit bounds the recursion.
            // The target is re-decoded on every hit, so the shared node
            // budget is what keeps repeated references from expanding a
            // small input into a huge tree.
            if offset >= tag_pos as u64 {
                return Err(UnpackError::RefOutOfRange {
                    offset,
                    limit: tag_pos,
                });
            }
            check_depth(limits, depth)?;
            let mut sub = u.sub_decoder(offset)?;
            extract_value(&mut sub, limits, depth + 1, nodes)
        }
        Extract::Index => Err(UnpackError::RoleMismatch {
            role: Role::Value,
            tag: TAG_IDX,
        }),
        Extract::Eos => Err(UnpackError::RoleMismatch {
            role: Role::Value,
            tag: TAG_EOS,
        }),
    }
}

const fn check_depth(limits: &Limits, depth: usize) -> UnpackResult<()> {
    if depth >= limits.max_depth {
        return Err(UnpackError::DepthLimitExceeded {
            limit: limits.max_depth,
        });
    }
    Ok(())
}

/// Charges `n` produced values against the decode-wide node budget.
fn charge_nodes(limits: &Limits, nodes: &mut usize, n: usize) -> UnpackResult<()> {
    *nodes = nodes.saturating_add(n);
    if *nodes > limits.max_total_nodes {
        return Err(UnpackError::NodeLimitExceeded {
            limit: limits.max_total_nodes,
        });
    }
    Ok(())
}

/// Writes `value` into slot `index`, padding any gap with nil. A slot
/// written twice keeps the later value.
fn place_at(items: &mut Vec<Value>, index: usize, value: Value) {
    if index < items.len() {
        items[index] = value;
        return;
    }
    items.resize(index, Value::Nil);
    items.push(value);
}

fn decode_array(
    u: &mut Unpacker<'_>,
    declared: Option<u64>,
    limits: &Limits,
    depth: usize,
    nodes: &mut usize,
) -> UnpackResult<Value> {
    let mut items = Vec::with_capacity(cap_hint(declared));
    let mut remaining = declared;
    loop {
        if remaining == Some(0) {
            break;
        }
        let tag_pos = u.position();
        let Some(item) = u.next()? else {
            return Err(UnpackError::UnexpectedEnd);
        };
        match item {
            Extract::Eos if declared.is_none() => break,
            Extract::Eos => {
                return Err(UnpackError::RoleMismatch {
                    role: Role::Element,
                    tag: TAG_EOS,
                })
            }
            // An index marker redirects the next element to an explicit
            // slot; marker, index and element count as one entry.
            Extract::Index => {
                let index = u.read_index()?;
                if index >= limits.max_array_fill as u64 {
                    return Err(UnpackError::IndexOutOfRange {
                        index,
                        limit: limits.max_array_fill,
                    });
                }
                // Nil padding counts against the node budget too.
                let slot = index as usize;
                if slot > items.len() {
                    charge_nodes(limits, nodes, slot - items.len())?;
                }
                let value = extract_value(u, limits, depth, nodes)?;
                place_at(&mut items, slot, value);
            }
            other => {
                let value = extract_from(u, other, tag_pos, limits, depth, nodes)?;
                items.push(value);
            }
        }
        if let Some(n) = remaining.as_mut() {
            *n -= 1;
        }
    }
    Ok(Value::Arr(items))
}

fn decode_map(
    u: &mut Unpacker<'_>,
    declared: Option<u64>,
    limits: &Limits,
    depth: usize,
    nodes: &mut usize,
) -> UnpackResult<Value> {
    let mut pairs = Vec::with_capacity(cap_hint(declared));
    let mut remaining = declared;
    loop {
        if remaining == Some(0) {
            break;
        }
        let key = match u.read_key(declared.is_none())? {
            Some(KeyExtract::Uint(v)) => Value::Uint(v),
            Some(KeyExtract::Int(v)) => Value::Int(v),
            Some(KeyExtract::Str(bytes)) => Value::Str(bytes.to_vec()),
            None => break,
        };
        charge_nodes(limits, nodes, 1)?;
        let value = extract_value(u, limits, depth, nodes)?;
        pairs.push((key, value));
        if let Some(n) = remaining.as_mut() {
            *n -= 1;
        }
    }
    Ok(Value::Map(pairs))
}

fn decode_set(
    u: &mut Unpacker<'_>,
    declared: Option<u64>,
    limits: &Limits,
    depth: usize,
    nodes: &mut usize,
) -> UnpackResult<Value> {
    let mut items = Vec::with_capacity(cap_hint(declared));
    let mut remaining = declared;
    loop {
        if remaining == Some(0) {
            break;
        }
        let tag_pos = u.position();
        match u.read_element(declared.is_none())? {
            Some(item) => {
                let value = extract_from(u, item, tag_pos, limits, depth, nodes)?;
                items.push(value);
            }
            None => break,
        }
        if let Some(n) = remaining.as_mut() {
            *n -= 1;
        }
    }
    Ok(Value::Set(items))
}
