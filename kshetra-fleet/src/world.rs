//! In-memory world model: maps and robots, keyed by id.
//!
//! Robots reference their map by id only; membership lists on the map side
//! are derived bookkeeping, so there are no back-pointers to keep in sync.
//! Deleting a map cascades to every robot that inhabits it.

use crate::core::Position;
use crate::error::{Error, Result};
use crate::grid::OccupancyGrid;
use crate::robot::Robot;
use log::debug;
use std::collections::HashMap;

/// One rasterized map: its occupancy grid plus identity and provenance.
#[derive(Clone, Debug)]
pub struct MapRecord {
    pub id: String,
    pub name: String,
    /// Where the source image came from; opaque to the core.
    pub map_url: String,
    pub grid: OccupancyGrid,
    robot_ids: Vec<String>,
}

impl MapRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        map_url: impl Into<String>,
        grid: OccupancyGrid,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            map_url: map_url.into(),
            grid,
            robot_ids: Vec::new(),
        }
    }

    /// Ids of robots on this map, in arrival order.
    pub fn robot_ids(&self) -> &[String] {
        &self.robot_ids
    }
}

/// Owns every map and robot in the process.
#[derive(Default)]
pub struct World {
    maps: HashMap<String, MapRecord>,
    robots: HashMap<String, Robot>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a map, replacing any previous map with the same id.
    ///
    /// Membership is recomputed from the robots that already reference the
    /// id, so replacing a map keeps its fleet.
    pub fn add_map(&mut self, mut record: MapRecord) {
        record.robot_ids = self
            .robots
            .values()
            .filter(|r| r.map_id == record.id)
            .map(|r| r.id.clone())
            .collect();
        self.maps.insert(record.id.clone(), record);
    }

    pub fn map(&self, id: &str) -> Option<&MapRecord> {
        self.maps.get(id)
    }

    pub fn map_mut(&mut self, id: &str) -> Option<&mut MapRecord> {
        self.maps.get_mut(id)
    }

    /// Remove a map and cascade: every robot inhabiting it is removed too.
    pub fn remove_map(&mut self, id: &str) -> Option<MapRecord> {
        let record = self.maps.remove(id)?;
        let doomed: Vec<String> = self
            .robots
            .values()
            .filter(|r| r.map_id == id)
            .map(|r| r.id.clone())
            .collect();
        for robot_id in &doomed {
            self.robots.remove(robot_id);
        }
        debug!("removed map {} and {} robots", id, doomed.len());
        Some(record)
    }

    /// Insert or replace a robot.
    ///
    /// A non-empty `map_id` must reference an existing map; the robot is
    /// recorded in that map's membership list and removed from the previous
    /// map's list when it changes homes. A robot is on at most one map.
    pub fn upsert_robot(&mut self, robot: Robot) -> Result<()> {
        if !robot.map_id.is_empty() && !self.maps.contains_key(&robot.map_id) {
            return Err(Error::NotFound(format!("map {}", robot.map_id)));
        }

        if let Some(previous) = self.robots.get(&robot.id) {
            if previous.map_id != robot.map_id {
                if let Some(old_map) = self.maps.get_mut(&previous.map_id) {
                    old_map.robot_ids.retain(|id| id != &robot.id);
                }
            }
        }

        if let Some(map) = self.maps.get_mut(&robot.map_id) {
            if !map.robot_ids.contains(&robot.id) {
                map.robot_ids.push(robot.id.clone());
            }
        }

        self.robots.insert(robot.id.clone(), robot);
        Ok(())
    }

    pub fn robot(&self, id: &str) -> Option<&Robot> {
        self.robots.get(id)
    }

    pub fn robot_mut(&mut self, id: &str) -> Option<&mut Robot> {
        self.robots.get_mut(id)
    }

    /// Remove a robot and strip it from its map's membership list.
    pub fn remove_robot(&mut self, id: &str) -> Option<Robot> {
        let robot = self.robots.remove(id)?;
        if let Some(map) = self.maps.get_mut(&robot.map_id) {
            map.robot_ids.retain(|rid| rid != id);
        }
        Some(robot)
    }

    /// Update a robot's pose. The position must be finite.
    pub fn set_robot_position(&mut self, id: &str, x: f32, y: f32) -> Result<()> {
        if !Position::new(x, y).is_finite() {
            return Err(Error::InvalidArgument(format!(
                "position must be finite, got ({}, {})",
                x, y
            )));
        }
        let robot = self
            .robots
            .get_mut(id)
            .ok_or_else(|| Error::NotFound(format!("robot {}", id)))?;
        robot.set_position(x, y);
        Ok(())
    }

    /// Robots on a map, in membership order.
    pub fn robots_on_map(&self, map_id: &str) -> Vec<&Robot> {
        let Some(map) = self.maps.get(map_id) else {
            return Vec::new();
        };
        map.robot_ids
            .iter()
            .filter_map(|id| self.robots.get(id))
            .collect()
    }

    /// Grid of a map together with a mutable robot, borrowed disjointly.
    ///
    /// The planner needs to read the grid while moving the robot; maps and
    /// robots live in separate collections, so both borrows coexist.
    pub fn grid_and_robot_mut(
        &mut self,
        map_id: &str,
        robot_id: &str,
    ) -> Option<(&OccupancyGrid, &mut Robot)> {
        let map = self.maps.get(map_id)?;
        let robot = self.robots.get_mut(robot_id)?;
        Some((&map.grid, robot))
    }

    pub fn maps(&self) -> impl Iterator<Item = &MapRecord> {
        self.maps.values()
    }

    pub fn robots(&self) -> impl Iterator<Item = &Robot> {
        self.robots.values()
    }
}
