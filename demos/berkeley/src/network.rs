//! Built-in OSM extract used when no `--osm` file is given.
//!
//! A handful of real downtown Berkeley intersections: Shattuck Ave and
//! Milvia St running north-south, crossed by Hearst, University and
//! Bancroft.  A footway and a building outline are included so the
//! highway filter and isolated-node pruning have something to do.

pub const DOWNTOWN_OSM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="hand">
  <node id="1001" lat="37.8738" lon="-122.2686"><tag k="name" v="Shattuck &amp; Hearst"/></node>
  <node id="1002" lat="37.8716" lon="-122.2682"><tag k="name" v="Shattuck &amp; University"/></node>
  <node id="1003" lat="37.8677" lon="-122.2677"><tag k="name" v="Shattuck &amp; Bancroft"/></node>
  <node id="1004" lat="37.8741" lon="-122.2718"/>
  <node id="1005" lat="37.8719" lon="-122.2714"/>
  <node id="1006" lat="37.8680" lon="-122.2709"/>
  <node id="1007" lat="37.8721" lon="-122.2600"/>
  <node id="2001" lat="37.8700" lon="-122.2650"/>
  <node id="2002" lat="37.8702" lon="-122.2640"/>
  <node id="3001" lat="37.8710" lon="-122.2660"/>
  <way id="1">
    <nd ref="1001"/><nd ref="1002"/><nd ref="1003"/>
    <tag k="highway" v="primary"/><tag k="name" v="Shattuck Avenue"/>
  </way>
  <way id="2">
    <nd ref="1004"/><nd ref="1005"/><nd ref="1006"/>
    <tag k="highway" v="residential"/><tag k="name" v="Milvia Street"/>
  </way>
  <way id="3">
    <nd ref="1004"/><nd ref="1001"/>
    <tag k="highway" v="secondary"/><tag k="name" v="Hearst Avenue"/>
  </way>
  <way id="4">
    <nd ref="1005"/><nd ref="1002"/><nd ref="1007"/>
    <tag k="highway" v="secondary"/><tag k="name" v="University Avenue"/>
  </way>
  <way id="5">
    <nd ref="1006"/><nd ref="1003"/>
    <tag k="highway" v="tertiary"/><tag k="name" v="Bancroft Way"/>
  </way>
  <way id="6">
    <nd ref="2001"/><nd ref="2002"/>
    <tag k="highway" v="footway"/>
  </way>
  <way id="7">
    <nd ref="3001"/><nd ref="3001"/>
    <tag k="building" v="yes"/>
  </way>
</osm>
"#;
