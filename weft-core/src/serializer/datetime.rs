// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Time bodies: dates as days since the Unix epoch (fixed i32), timestamps
//! as microseconds since the Unix epoch (fixed i64).

use chrono::{DateTime, NaiveDate};

use crate::error::Error;
use crate::resolver::context::{ReadContext, WriteContext};
use crate::serializer::ValueSerializer;
use crate::value::Value;

fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()
}

pub struct DateSerializer;

impl ValueSerializer for DateSerializer {
    fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error> {
        match value {
            Value::Date(date) => {
                let days = date.signed_duration_since(epoch_date()).num_days();
                context.writer.write_i32(days as i32);
                Ok(())
            }
            other => Err(Error::invalid_data(format!(
                "date slot holds {}",
                other.kind_name()
            ))),
        }
    }

    fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error> {
        let offset = context.reader.cursor();
        let days = context.reader.read_i32()?;
        epoch_date()
            .checked_add_signed(chrono::Duration::days(days as i64))
            .map(Value::Date)
            .ok_or_else(|| {
                Error::invalid_data(format!("date out of range ({days} days) at offset {offset}"))
            })
    }
}

pub struct TimestampSerializer;

impl ValueSerializer for TimestampSerializer {
    fn write_data(&self, value: &Value, context: &mut WriteContext) -> Result<(), Error> {
        match value {
            Value::Timestamp(ts) => {
                context.writer.write_i64(ts.and_utc().timestamp_micros());
                Ok(())
            }
            other => Err(Error::invalid_data(format!(
                "timestamp slot holds {}",
                other.kind_name()
            ))),
        }
    }

    fn read_data(&self, context: &mut ReadContext) -> Result<Value, Error> {
        let offset = context.reader.cursor();
        let micros = context.reader.read_i64()?;
        DateTime::from_timestamp_micros(micros)
            .map(|dt| Value::Timestamp(dt.naive_utc()))
            .ok_or_else(|| {
                Error::invalid_data(format!(
                    "timestamp out of range ({micros} us) at offset {offset}"
                ))
            })
    }
}
