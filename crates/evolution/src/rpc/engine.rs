//! Wire shapes of the quant engine's `EngineService`.
//!
//! ```thrift
//! enum QuantType { Stock = 1 }
//! struct Response { 1: string data }
//! service EngineService { Response GetType(1: QuantType type) }
//! ```

use thrift::protocol::{
    TFieldIdentifier, TInputProtocol, TMessageIdentifier, TMessageType, TOutputProtocol,
    TStructIdentifier, TType,
};

use super::RpcError;

/// Service method name.
pub const GET_TYPE: &str = "GetType";

/// Kind of instrument the classification is requested for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum QuantType {
    Stock = 1,
}

impl QuantType {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            1 => Some(QuantType::Stock),
            _ => None,
        }
    }
}

/// Write a `GetType` call.
pub fn write_get_type_call(
    o: &mut dyn TOutputProtocol,
    sequence: i32,
    kind: QuantType,
) -> thrift::Result<()> {
    o.write_message_begin(&TMessageIdentifier::new(
        GET_TYPE,
        TMessageType::Call,
        sequence,
    ))?;
    o.write_struct_begin(&TStructIdentifier::new("GetType_args"))?;
    o.write_field_begin(&TFieldIdentifier::new("type", TType::I32, 1i16))?;
    o.write_i32(kind as i32)?;
    o.write_field_end()?;
    o.write_field_stop()?;
    o.write_struct_end()?;
    o.write_message_end()?;
    o.flush()
}

/// Read the reply to a `GetType` call and return its `data` string.
pub fn read_get_type_reply(i: &mut dyn TInputProtocol, sequence: i32) -> Result<String, RpcError> {
    let ident = i.read_message_begin()?;
    if ident.message_type == TMessageType::Exception {
        let remote = thrift::Error::read_application_error_from_in_protocol(i)?;
        i.read_message_end()?;
        return Err(RpcError::Remote(remote.message));
    }
    if ident.message_type != TMessageType::Reply {
        return Err(RpcError::Unexpected(format!(
            "expected a reply, got {:?}",
            ident.message_type
        )));
    }
    if ident.name != GET_TYPE {
        return Err(RpcError::Unexpected(format!(
            "reply is for {}, expected {}",
            ident.name, GET_TYPE
        )));
    }
    if ident.sequence_number != sequence {
        return Err(RpcError::Unexpected(format!(
            "reply sequence {} does not match call {}",
            ident.sequence_number, sequence
        )));
    }

    // GetType_result { 0: Response success }
    let mut success = None;
    i.read_struct_begin()?;
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(0), TType::Struct) => success = Some(read_response(i)?),
            (_, field_type) => i.skip(field_type)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    i.read_message_end()?;

    success.ok_or_else(|| RpcError::Unexpected("GetType returned no result".to_string()))
}

/// Response { 1: string data }
fn read_response(i: &mut dyn TInputProtocol) -> Result<String, RpcError> {
    let mut data = String::new();
    i.read_struct_begin()?;
    loop {
        let field = i.read_field_begin()?;
        if field.field_type == TType::Stop {
            break;
        }
        match (field.id, field.field_type) {
            (Some(1), TType::String) => data = i.read_string()?,
            (_, field_type) => i.skip(field_type)?,
        }
        i.read_field_end()?;
    }
    i.read_struct_end()?;
    Ok(data)
}
