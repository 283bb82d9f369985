/*
 * Copyright © 2024, United States Government, as represented by the Administrator of
 * the National Aeronautics and Space Administration. All rights reserved.
 *
 * The “ODIN” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */
#![allow(unused)]

mod stubs;

use chrono::{NaiveDate, TimeZone, Utc};
use odin_hrrr::{fetch_latest_dataset, fetch::cycle_url, ForecastCycle, HrrrMonitorConfig, OdinHrrrError};
use stubs::StubService;

// run with "cargo test test_xx -- --nocapture"

#[test]
fn test_cycle_url() {
    let date = NaiveDate::from_ymd_opt( 2024, 6, 12).unwrap();
    assert_eq!( cycle_url( "http://nomads.ncep.noaa.gov:9090/dods/hrrr/", "hrrr", &date, 4),
                "http://nomads.ncep.noaa.gov:9090/dods/hrrr/hrrr20240612/hrrr_sfc_04z");
}

#[test]
fn test_cycle_for_lookback() {
    let reference = Utc.with_ymd_and_hms( 2024, 3, 1, 1, 42, 10).unwrap();

    let c = ForecastCycle::for_lookback( &reference, 0);
    assert_eq!( (c.issue_date, c.issue_hour), (NaiveDate::from_ymd_opt( 2024, 3, 1).unwrap(), 1));

    let c = ForecastCycle::for_lookback( &reference, 2);
    assert_eq!( (c.issue_date, c.issue_hour, c.lead_hours), (NaiveDate::from_ymd_opt( 2024, 2, 29).unwrap(), 23, 2));
}

#[tokio::test]
async fn test_fetch_with_fallback() {
    let cfg = HrrrMonitorConfig::default();
    let reference = Utc.with_ymd_and_hms( 2024, 6, 12, 15, 5, 0).unwrap();
    let service = StubService::new( 3, vec![1.0]);

    let fetched = fetch_latest_dataset( &service, &cfg, &reference, 0).await.unwrap();
    let opened = service.opened();
    println!("opened: {opened:#?}");

    assert_eq!( fetched.attempts, 4);
    assert_eq!( opened.len(), 4);
    assert_eq!( fetched.cycle.issue_hour, 12);
    assert_eq!( fetched.cycle.lead_hours, 3);
    for (i,url) in opened.iter().enumerate() {
        assert!( url.ends_with( &format!("hrrr20240612/hrrr_sfc_{:02}z", 15 - i)));
    }
    assert_eq!( fetched.dataset.url(), opened[3]);
}

#[tokio::test]
async fn test_fetch_exhausted() {
    let cfg = HrrrMonitorConfig { max_lookback: 5, ..HrrrMonitorConfig::default() };
    let reference = Utc.with_ymd_and_hms( 2024, 6, 12, 15, 5, 0).unwrap();
    let service = StubService::new( 100, vec![1.0]);

    let res = fetch_latest_dataset( &service, &cfg, &reference, 0).await;
    assert!( matches!( res, Err(OdinHrrrError::SourceUnavailable(_))));
    assert_eq!( service.opened().len(), 6); // lookback 0..=5
}

#[tokio::test]
async fn test_fetch_skips_empty_datasets() {
    let cfg = HrrrMonitorConfig { max_lookback: 2, ..HrrrMonitorConfig::default() };
    let reference = Utc.with_ymd_and_hms( 2024, 6, 12, 15, 5, 0).unwrap();
    let mut service = StubService::new( 0, vec![1.0]);
    service.empty_variables = true;

    let res = fetch_latest_dataset( &service, &cfg, &reference, 0).await;
    assert!( matches!( res, Err(OdinHrrrError::SourceUnavailable(_))));
    assert_eq!( service.opened().len(), 3);
}
