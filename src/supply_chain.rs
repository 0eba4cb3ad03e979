//! Deterministic supply-chain instance generator.
//!
//! Produces integer parameters with a guaranteed positive unit margin, then
//! instantiates the production/distribution planning program over the
//! builder: production `P[i,j]`, factory-to-warehouse shipments `X[i,j,k]`,
//! warehouse-to-store shipments `Y[i,k,l]`, unmet demand `U[i,l]`, and the
//! open/closed indicators `W[k]`, `S[l]`.

use crate::config::SolverConfig;
use crate::constraint::Relation;
use crate::error::SolverError;
use crate::program::Program;
use crate::simplex::OptDir;

/// Generator knobs. Values are small, integral, and sized so every product
/// can be sold at a profit somewhere.
#[derive(Clone, Debug)]
pub struct ScGenCfg {
    pub products: usize,
    pub factories: usize,
    pub warehouses: usize,
    pub stores: usize,

    // volume per item: vol_start + i * vol_step
    pub vol_start: i64,
    pub vol_step: i64,

    // unit hours: time_base + i + (j % 2) * time_parity_bonus
    pub time_base: i64,
    pub time_parity_bonus: i64,

    // production cost: (cost_base + cost_step * i) shifted per factory by a
    // linear gradient of +-cost_grad_pct percent
    pub cost_base: i64,
    pub cost_step: i64,
    pub cost_grad_pct: i64,

    // demand ceiling: demand_base + demand_i_step * i + demand_l_step * (l % 4)
    pub demand_base: i64,
    pub demand_i_step: i64,
    pub demand_l_step: i64,

    // freight per unit volume on each leg
    pub tc1_base: i64,
    pub tc2_base: i64,
    pub tc_step: i64,

    // selling price: cheapest production + cheapest routed freight + margin
    pub margin_frac: f64,
    pub margin_floor_base: i64,
    pub margin_floor_step: i64,

    // unmet-demand penalty as a fraction of price
    pub penalty_frac: f64,

    // factory hour ceiling targets cap_util of total demand hours
    pub cap_util: f64,
    pub cap_buffer: i64,

    // warehouse throughput as a share of total demand volume
    pub wh_capacity_share: f64,

    // fixed rents, kept small against profits
    pub wh_rent_base: i64,
    pub wh_rent_step: i64,
    pub store_rent_base: i64,
    pub store_rent_step: i64,
}

impl Default for ScGenCfg {
    fn default() -> Self {
        Self {
            products: 3,
            factories: 2,
            warehouses: 1,
            stores: 2,
            vol_start: 1,
            vol_step: 1,
            time_base: 1,
            time_parity_bonus: 1,
            cost_base: 200,
            cost_step: 100,
            cost_grad_pct: 8,
            demand_base: 20,
            demand_i_step: 5,
            demand_l_step: 3,
            tc1_base: 8,
            tc2_base: 9,
            tc_step: 2,
            margin_frac: 0.25,
            margin_floor_base: 20,
            margin_floor_step: 5,
            penalty_frac: 0.6,
            cap_util: 0.7,
            cap_buffer: 50,
            wh_capacity_share: 0.5,
            wh_rent_base: 2000,
            wh_rent_step: 200,
            store_rent_base: 6000,
            store_rent_step: 500,
        }
    }
}

impl ScGenCfg {
    pub fn with_dims(products: usize, factories: usize, warehouses: usize, stores: usize) -> Self {
        Self {
            products,
            factories,
            warehouses,
            stores,
            ..Self::default()
        }
    }
}

/// Generated instance parameters. Everything is stored as `f64` but holds
/// whole numbers by construction.
#[derive(Clone, Debug)]
pub struct ScParams {
    pub prod: Vec<String>,
    pub fac: Vec<String>,
    pub wh: Vec<String>,
    pub store: Vec<String>,

    pub volume: Vec<f64>,
    pub price: Vec<Vec<f64>>,
    pub demand: Vec<Vec<f64>>,
    pub penalty: Vec<Vec<f64>>,
    pub prod_cost: Vec<Vec<f64>>,
    pub prod_time: Vec<Vec<f64>>,
    pub cap: Vec<f64>,
    pub wh_rent: Vec<f64>,
    pub wh_cap: Vec<f64>,
    pub store_rent: Vec<f64>,
    pub tc1: Vec<Vec<f64>>,
    pub tc2: Vec<Vec<f64>>,
}

fn product_names(n: usize) -> Vec<String> {
    (0..n)
        .map(|i| {
            let base = (b'A' + (i % 26) as u8) as char;
            match i / 26 {
                0 => base.to_string(),
                round => format!("{base}{}", round + 1),
            }
        })
        .collect()
}

fn seq_names(prefix: &str, n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{prefix}{i}")).collect()
}

impl ScParams {
    pub fn generate(cfg: &ScGenCfg) -> Self {
        let (ni, nj, nk, nl) = (cfg.products, cfg.factories, cfg.warehouses, cfg.stores);

        let volume: Vec<i64> = (0..ni)
            .map(|i| (cfg.vol_start + cfg.vol_step * i as i64).max(1))
            .collect();

        let prod_time: Vec<Vec<i64>> = (0..ni)
            .map(|i| {
                (0..nj)
                    .map(|j| {
                        (cfg.time_base + i as i64 + (j % 2) as i64 * cfg.time_parity_bonus).max(1)
                    })
                    .collect()
            })
            .collect();

        let prod_cost: Vec<Vec<i64>> = (0..ni)
            .map(|i| {
                let base = (cfg.cost_base + cfg.cost_step * i as i64).max(1);
                (0..nj)
                    .map(|j| {
                        let shift = if nj > 1 {
                            (j as i64 * 2 * cfg.cost_grad_pct) / (nj as i64 - 1) - cfg.cost_grad_pct
                        } else {
                            0
                        };
                        (base * (100 + shift) / 100).max(1)
                    })
                    .collect()
            })
            .collect();

        let demand: Vec<Vec<i64>> = (0..ni)
            .map(|i| {
                (0..nl)
                    .map(|l| {
                        (cfg.demand_base
                            + cfg.demand_i_step * i as i64
                            + cfg.demand_l_step * (l % 4) as i64)
                            .max(0)
                    })
                    .collect()
            })
            .collect();

        let tc1: Vec<Vec<i64>> = (0..nj)
            .map(|j| {
                (0..nk)
                    .map(|k| (cfg.tc1_base + cfg.tc_step * ((j % 3) + (k % 4)) as i64).max(0))
                    .collect()
            })
            .collect();
        let tc2: Vec<Vec<i64>> = (0..nk)
            .map(|k| {
                (0..nl)
                    .map(|l| (cfg.tc2_base + cfg.tc_step * ((k % 4) + (l % 4)) as i64).max(0))
                    .collect()
            })
            .collect();

        // cheapest production per product and cheapest routed freight per
        // store, per unit volume; prices build on these so margins stay
        // positive
        let min_prod: Vec<i64> = (0..ni)
            .map(|i| (0..nj).map(|j| prod_cost[i][j]).min().unwrap_or(0))
            .collect();
        let min_ship_per_vol: Vec<i64> = (0..nl)
            .map(|l| {
                (0..nk)
                    .map(|k| (0..nj).map(|j| tc1[j][k]).min().unwrap_or(0) + tc2[k][l])
                    .min()
                    .unwrap_or(0)
            })
            .collect();

        let price: Vec<Vec<i64>> = (0..ni)
            .map(|i| {
                let margin = ((min_prod[i] as f64 * cfg.margin_frac).floor() as i64)
                    .max(cfg.margin_floor_base + cfg.margin_floor_step * i as i64)
                    .max(1);
                (0..nl)
                    .map(|l| {
                        let ship = volume[i] * min_ship_per_vol[l].max(0);
                        (min_prod[i] + ship + margin).max(min_prod[i] + ship + 1)
                    })
                    .collect()
            })
            .collect();

        let penalty: Vec<Vec<i64>> = (0..ni)
            .map(|i| {
                (0..nl)
                    .map(|l| ((price[i][l] as f64 * cfg.penalty_frac).floor() as i64).max(0))
                    .collect()
            })
            .collect();

        let sum_demand: Vec<i64> = (0..ni).map(|i| demand[i].iter().sum()).collect();

        let cap: Vec<i64> = (0..nj)
            .map(|j| {
                let hours: i64 = (0..ni).map(|i| sum_demand[i] * prod_time[i][j]).sum();
                let target = ((hours / nj.max(1) as i64) as f64 * cfg.cap_util).floor() as i64
                    + cfg.cap_buffer;
                target.max(1)
            })
            .collect();

        let total_volume: i64 = (0..ni).map(|i| sum_demand[i] * volume[i]).sum();
        let wh_cap: Vec<i64> = (0..nk)
            .map(|_| {
                let share =
                    (total_volume as f64 * cfg.wh_capacity_share / nk.max(1) as f64).floor() as i64;
                share.max(1)
            })
            .collect();

        let wh_rent: Vec<i64> = (0..nk)
            .map(|k| cfg.wh_rent_base + cfg.wh_rent_step * (k as i64 + 1))
            .collect();
        let store_rent: Vec<i64> = (0..nl)
            .map(|l| cfg.store_rent_base + cfg.store_rent_step * (l as i64 + 1))
            .collect();

        let as_f64 = |v: &[i64]| v.iter().map(|&x| x as f64).collect::<Vec<f64>>();
        let as_f64_2d = |m: &[Vec<i64>]| m.iter().map(|r| as_f64(r)).collect::<Vec<Vec<f64>>>();

        Self {
            prod: product_names(ni),
            fac: seq_names("F", nj),
            wh: seq_names("W", nk),
            store: seq_names("S", nl),
            volume: as_f64(&volume),
            price: as_f64_2d(&price),
            demand: as_f64_2d(&demand),
            penalty: as_f64_2d(&penalty),
            prod_cost: as_f64_2d(&prod_cost),
            prod_time: as_f64_2d(&prod_time),
            cap: as_f64(&cap),
            wh_rent: as_f64(&wh_rent),
            wh_cap: as_f64(&wh_cap),
            store_rent: as_f64(&store_rent),
            tc1: as_f64_2d(&tc1),
            tc2: as_f64_2d(&tc2),
        }
    }
}

fn v_p(i: &str, j: &str) -> String {
    format!("P[{i},{j}]")
}
fn v_x(i: &str, j: &str, k: &str) -> String {
    format!("X[{i},{j},{k}]")
}
fn v_y(i: &str, k: &str, l: &str) -> String {
    format!("Y[{i},{k},{l}]")
}
fn v_u(i: &str, l: &str) -> String {
    format!("U[{i},{l}]")
}
fn v_w(k: &str) -> String {
    format!("W[{k}]")
}
fn v_s(l: &str) -> String {
    format!("S[{l}]")
}

/// Instantiate the planning program: maximize net profit subject to
/// capacity, flow conservation, demand balance, and activation logic.
pub fn build_supply_chain_program(
    p: &ScParams,
    config: SolverConfig,
) -> Result<Program, SolverError> {
    let (ni, nj, nk, nl) = (p.prod.len(), p.fac.len(), p.wh.len(), p.store.len());

    // revenue, minus production cost, freight on both legs priced by
    // volume, fixed rents, and unmet-demand penalties
    let mut obj: Vec<(f64, String)> = Vec::new();
    for i in 0..ni {
        for l in 0..nl {
            for k in 0..nk {
                obj.push((p.price[i][l], v_y(&p.prod[i], &p.wh[k], &p.store[l])));
            }
        }
    }
    for i in 0..ni {
        for j in 0..nj {
            obj.push((-p.prod_cost[i][j], v_p(&p.prod[i], &p.fac[j])));
        }
    }
    for i in 0..ni {
        for j in 0..nj {
            for k in 0..nk {
                obj.push((
                    -p.tc1[j][k] * p.volume[i],
                    v_x(&p.prod[i], &p.fac[j], &p.wh[k]),
                ));
            }
        }
    }
    for i in 0..ni {
        for k in 0..nk {
            for l in 0..nl {
                obj.push((
                    -p.tc2[k][l] * p.volume[i],
                    v_y(&p.prod[i], &p.wh[k], &p.store[l]),
                ));
            }
        }
    }
    for k in 0..nk {
        obj.push((-p.wh_rent[k], v_w(&p.wh[k])));
    }
    for l in 0..nl {
        obj.push((-p.store_rent[l], v_s(&p.store[l])));
    }
    for i in 0..ni {
        for l in 0..nl {
            obj.push((-p.penalty[i][l], v_u(&p.prod[i], &p.store[l])));
        }
    }

    let mut program = Program::new(OptDir::Max, &obj)?.with_config(config);

    // factory hour capacity
    for j in 0..nj {
        let terms: Vec<(f64, String)> = (0..ni)
            .map(|i| (p.prod_time[i][j], v_p(&p.prod[i], &p.fac[j])))
            .collect();
        program.add_constraint(&terms, Relation::Le, p.cap[j])?;
    }

    // everything produced leaves the factory
    for i in 0..ni {
        for j in 0..nj {
            let mut terms = vec![(1.0, v_p(&p.prod[i], &p.fac[j]))];
            for k in 0..nk {
                terms.push((-1.0, v_x(&p.prod[i], &p.fac[j], &p.wh[k])));
            }
            program.add_constraint(&terms, Relation::Eq, 0.0)?;
        }
    }

    // warehouse flow conservation
    for i in 0..ni {
        for k in 0..nk {
            let mut terms: Vec<(f64, String)> = (0..nj)
                .map(|j| (1.0, v_x(&p.prod[i], &p.fac[j], &p.wh[k])))
                .collect();
            for l in 0..nl {
                terms.push((-1.0, v_y(&p.prod[i], &p.wh[k], &p.store[l])));
            }
            program.add_constraint(&terms, Relation::Eq, 0.0)?;
        }
    }

    // warehouse throughput by volume, gated on the warehouse being open
    for k in 0..nk {
        let mut terms = Vec::new();
        for i in 0..ni {
            for j in 0..nj {
                terms.push((p.volume[i], v_x(&p.prod[i], &p.fac[j], &p.wh[k])));
            }
        }
        terms.push((-p.wh_cap[k], v_w(&p.wh[k])));
        program.add_constraint(&terms, Relation::Le, 0.0)?;
    }

    // demand balance with an unmet-demand slack, and its ceiling
    for i in 0..ni {
        for l in 0..nl {
            let mut terms: Vec<(f64, String)> = (0..nk)
                .map(|k| (1.0, v_y(&p.prod[i], &p.wh[k], &p.store[l])))
                .collect();
            terms.push((1.0, v_u(&p.prod[i], &p.store[l])));
            program.add_constraint(&terms, Relation::Eq, p.demand[i][l])?;

            program.add_constraint(
                &[(1.0, v_u(&p.prod[i], &p.store[l]))],
                Relation::Le,
                p.demand[i][l],
            )?;
        }
    }

    // store activation big-M, with M the demand ceiling
    for i in 0..ni {
        for l in 0..nl {
            let mut terms: Vec<(f64, String)> = (0..nk)
                .map(|k| (1.0, v_y(&p.prod[i], &p.wh[k], &p.store[l])))
                .collect();
            terms.push((-p.demand[i][l], v_s(&p.store[l])));
            program.add_constraint(&terms, Relation::Le, 0.0)?;
        }
    }

    // open/closed indicators are binary
    for k in 0..nk {
        program.add_constraint(&[(1.0, v_w(&p.wh[k]))], Relation::Le, 1.0)?;
    }
    for l in 0..nl {
        program.add_constraint(&[(1.0, v_s(&p.store[l]))], Relation::Le, 1.0)?;
    }

    Ok(program)
}
