use clearing_core::{
    AgentId, AgentStatus, Anonymity, ClearingConfig, CommodityEffect, IntentKind, LocationId,
    LocationKind, Participant, Price, Quantity, Recipient, World,
};

const WOOL: u32 = 7;
const GRAIN: u32 = 8;

fn town() -> (World, LocationId) {
    let mut world = World::new(ClearingConfig::default().with_name(WOOL, "wool"));
    let region = world.add_location("Vale", LocationKind::Region, None).unwrap();
    let city = world.add_location("Harrowgate", LocationKind::City, Some(region)).unwrap();
    (world, city)
}

fn trader(world: &mut World, name: &str, at: LocationId, currency: Quantity, wool: Quantity) -> AgentId {
    let id = world.add_agent(name, at).unwrap();
    let agent = world.get_agent_mut(id).unwrap();
    agent.currency = currency;
    agent.goods.insert(WOOL, wool);
    id
}

fn post(world: &mut World, owner: Participant, kind: IntentKind, qty: Quantity, limit: Price) {
    world
        .submit_intent(owner, kind, WOOL, qty, limit, 0, Anonymity::Open)
        .unwrap();
}

fn wool(world: &World, id: AgentId) -> Quantity {
    world.get_agent(id).unwrap().held(WOOL)
}

fn gold(world: &World, id: AgentId) -> Quantity {
    world.get_agent(id).unwrap().currency
}

fn texts_for(world: &World, recipient: Recipient) -> Vec<String> {
    world
        .notices()
        .iter()
        .filter(|n| n.recipient == recipient)
        .map(|n| n.text.clone())
        .collect()
}

#[test]
fn high_bidder_pays_second_price() {
    let (mut world, city) = town();
    let seller = trader(&mut world, "Seller", city, 0, 100);
    let high = trader(&mut world, "High", city, 1_000, 0);
    let low = trader(&mut world, "Low", city, 1_000, 0);
    post(&mut world, Participant::Agent(seller), IntentKind::Sell, 100, 50);
    post(&mut world, Participant::Agent(high), IntentKind::Buy, 1, 100);
    post(&mut world, Participant::Agent(low), IntentKind::Buy, 1, 80);

    let report = world.clear_market(city);

    let first = &report.trades[0];
    assert_eq!(first.buyer, Participant::Agent(high));
    assert_eq!(first.unit_price, 81);
    assert_eq!(gold(&world, high), 1_000 - 81);
}

#[test]
fn tariff_routes_to_garrison() {
    let (mut world, city) = town();
    let guard = trader(&mut world, "Guard", city, 0, 0);
    let seller = trader(&mut world, "Seller", city, 0, 10);
    let buyer = trader(&mut world, "Buyer", city, 500, 0);
    {
        let loc = world.get_location_mut(city).unwrap();
        loc.garrison = Some(guard);
        loc.tax_rate_pct = 10;
    }
    post(&mut world, Participant::Agent(seller), IntentKind::Sell, 10, 20);
    post(&mut world, Participant::Agent(buyer), IntentKind::Buy, 10, 20);

    let report = world.clear_market(city);

    assert_eq!(report.trades.len(), 1);
    let trade = &report.trades[0];
    assert_eq!(trade.total_price, 200);
    assert_eq!(trade.tariff, 20);
    assert_eq!(gold(&world, seller), 180);
    assert_eq!(gold(&world, guard), 20);
    assert_eq!(gold(&world, buyer), 300);
    assert_eq!(
        texts_for(&world, Recipient::Agent(seller)),
        vec!["Sold 10 wool to Buyer for 180 gold after 20 gold in tariffs."]
    );
}

#[test]
fn administrator_sells_tariff_free() {
    let (mut world, city) = town();
    let guard = trader(&mut world, "Guard", city, 0, 0);
    let lord = trader(&mut world, "Lord", city, 0, 10);
    let buyer = trader(&mut world, "Buyer", city, 500, 0);
    {
        let loc = world.get_location_mut(city).unwrap();
        loc.garrison = Some(guard);
        loc.tax_rate_pct = 10;
        loc.administrator = Some(lord);
    }
    post(&mut world, Participant::Agent(lord), IntentKind::Sell, 10, 20);
    post(&mut world, Participant::Agent(buyer), IntentKind::Buy, 10, 20);

    world.clear_market(city);

    assert_eq!(gold(&world, lord), 200);
    assert_eq!(gold(&world, guard), 0);
}

#[test]
fn hub_supplies_unlimited_stock_at_its_ask() {
    let (mut world, city) = town();
    let buyer = trader(&mut world, "Buyer", city, 100, 0);
    post(&mut world, Participant::Hub(city), IntentKind::Sell, 1_000_000, 5);
    post(&mut world, Participant::Agent(buyer), IntentKind::Buy, 10, 6);

    let report = world.clear_market(city);

    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].quantity, 10);
    assert_eq!(report.trades[0].unit_price, 5);
    assert_eq!(wool(&world, buyer), 10);
    assert_eq!(gold(&world, buyer), 50);
}

#[test]
fn filled_bid_stops_holding_the_price_up() {
    let (mut world, city) = town();
    let seller = trader(&mut world, "Seller", city, 0, 5);
    let b = trader(&mut world, "B", city, 1_000, 0);
    let d = trader(&mut world, "D", city, 1_000, 0);
    post(&mut world, Participant::Agent(seller), IntentKind::Sell, 5, 10);
    post(&mut world, Participant::Agent(b), IntentKind::Buy, 5, 12);
    post(&mut world, Participant::Agent(d), IntentKind::Buy, 3, 15);

    let report = world.clear_market(city);

    assert_eq!(report.trades.len(), 2);
    let (first, second) = (&report.trades[0], &report.trades[1]);
    assert_eq!(first.buyer, Participant::Agent(d));
    assert_eq!((first.quantity, first.unit_price), (3, 13));
    assert_eq!(second.buyer, Participant::Agent(b));
    assert_eq!((second.quantity, second.unit_price), (2, 10));

    assert_eq!(gold(&world, seller), 39 + 20);
    assert_eq!(wool(&world, seller), 0);
    let remaining = world.list_standing_intents(Participant::Agent(b));
    assert_eq!(remaining[0].quantity, 3);
}

#[test]
fn equal_asks_fill_oldest_first() {
    let (mut world, city) = town();
    let early = trader(&mut world, "Early", city, 0, 5);
    let late = trader(&mut world, "Late", city, 0, 5);
    let buyer = trader(&mut world, "Buyer", city, 1_000, 0);
    post(&mut world, Participant::Agent(early), IntentKind::Sell, 5, 10);
    post(&mut world, Participant::Agent(late), IntentKind::Sell, 5, 10);
    post(&mut world, Participant::Agent(buyer), IntentKind::Buy, 3, 10);

    world.clear_market(city);

    assert_eq!(wool(&world, early), 2);
    assert_eq!(wool(&world, late), 5);
}

#[test]
fn tied_top_bids_price_each_other_out() {
    let (mut world, city) = town();
    let seller = trader(&mut world, "Seller", city, 0, 2);
    let first = trader(&mut world, "First", city, 1_000, 0);
    let second = trader(&mut world, "Second", city, 1_000, 0);
    post(&mut world, Participant::Agent(seller), IntentKind::Sell, 2, 10);
    post(&mut world, Participant::Agent(first), IntentKind::Buy, 2, 10);
    post(&mut world, Participant::Agent(second), IntentKind::Buy, 2, 10);

    assert!(world.clear_market(city).trades.is_empty());

    // Raising one bid by a unit breaks the tie at the runner-up's price plus one
    post(&mut world, Participant::Agent(second), IntentKind::Buy, 2, 11);
    let report = world.clear_market(city);

    assert_eq!(report.trades.len(), 1);
    assert_eq!(report.trades[0].buyer, Participant::Agent(second));
    assert_eq!(report.trades[0].unit_price, 11);
    assert_eq!(wool(&world, first), 0);
}

#[test]
fn resubmitting_moves_an_order_to_the_back() {
    let (mut world, city) = town();
    let early = trader(&mut world, "Early", city, 0, 5);
    let late = trader(&mut world, "Late", city, 0, 5);
    let buyer = trader(&mut world, "Buyer", city, 1_000, 0);
    post(&mut world, Participant::Agent(early), IntentKind::Sell, 5, 10);
    post(&mut world, Participant::Agent(late), IntentKind::Sell, 5, 10);
    post(&mut world, Participant::Agent(early), IntentKind::Sell, 5, 10);
    post(&mut world, Participant::Agent(buyer), IntentKind::Buy, 3, 10);

    world.clear_market(city);

    assert_eq!(wool(&world, early), 5);
    assert_eq!(wool(&world, late), 2);
}

#[test]
fn agents_aboard_ships_do_not_trade() {
    let (mut world, city) = town();
    let ship = world.add_location("Gull", LocationKind::Ship, Some(city)).unwrap();
    let sailor = trader(&mut world, "Sailor", ship, 1_000, 0);
    let seller = trader(&mut world, "Seller", city, 0, 5);
    post(&mut world, Participant::Agent(seller), IntentKind::Sell, 5, 10);
    post(&mut world, Participant::Agent(sailor), IntentKind::Buy, 5, 10);

    assert_eq!(world.market_hub(ship), None);
    let report = world.clear_market(city);

    assert!(report.trades.is_empty());
    assert_eq!(gold(&world, sailor), 1_000);
}

#[test]
fn buildings_and_trading_posts_resolve_to_their_hub() {
    let mut world = World::default();
    let post_loc = world.add_location("Ferry Post", LocationKind::TradingPost, None).unwrap();
    let inn = world.add_location("Inn", LocationKind::Building, Some(post_loc)).unwrap();
    let guest = trader(&mut world, "Guest", inn, 100, 0);
    post(&mut world, Participant::Hub(post_loc), IntentKind::Sell, 50, 4);
    post(&mut world, Participant::Agent(guest), IntentKind::Buy, 5, 4);

    let report = world.clear_market(post_loc);

    assert_eq!(report.volume(), 5);
    assert_eq!(wool(&world, guest), 5);
}

#[test]
fn captives_and_travellers_are_skipped() {
    let (mut world, city) = town();
    let seller = trader(&mut world, "Seller", city, 0, 5);
    let captive = trader(&mut world, "Captive", city, 1_000, 0);
    world.get_agent_mut(captive).unwrap().status = AgentStatus::Prisoner;
    post(&mut world, Participant::Agent(seller), IntentKind::Sell, 5, 10);
    post(&mut world, Participant::Agent(captive), IntentKind::Buy, 5, 10);

    assert!(world.clear_market(city).trades.is_empty());

    world.get_agent_mut(captive).unwrap().status = AgentStatus::Free;
    assert_eq!(world.clear_market(city).volume(), 5);
}

#[test]
fn hidden_identity_is_masked_in_notices() {
    let (mut world, city) = town();
    let seller = trader(&mut world, "Mira", city, 0, 5);
    let buyer = trader(&mut world, "Tobin", city, 1_000, 0);
    world
        .submit_intent(Participant::Agent(seller), IntentKind::Sell, WOOL, 2, 10, 0, Anonymity::HideIdentity)
        .unwrap();
    post(&mut world, Participant::Agent(buyer), IntentKind::Buy, 2, 10);

    world.clear_market(city);

    assert_eq!(
        texts_for(&world, Recipient::Agent(buyer)),
        vec!["Bought 2 wool from someone for 20 gold."]
    );
    assert_eq!(
        texts_for(&world, Recipient::Observers(city)),
        vec!["Tobin bought 2 wool from someone at 10 gold each."]
    );
}

#[test]
fn reports_hidden_trades_reach_only_the_parties() {
    let (mut world, city) = town();
    let seller = trader(&mut world, "Mira", city, 0, 5);
    let buyer = trader(&mut world, "Tobin", city, 1_000, 0);
    post(&mut world, Participant::Agent(seller), IntentKind::Sell, 2, 10);
    world
        .submit_intent(Participant::Agent(buyer), IntentKind::Buy, WOOL, 2, 10, 0, Anonymity::HideFromReports)
        .unwrap();

    world.clear_market(city);

    assert!(texts_for(&world, Recipient::Observers(city)).is_empty());
    assert_eq!(
        texts_for(&world, Recipient::Agent(seller)),
        vec!["Sold 2 wool to someone for 20 gold."]
    );
    assert_eq!(world.take_notices().len(), 2);
    assert!(world.notices().is_empty());
}

#[test]
fn market_report_hides_own_and_unreported_orders() {
    let (mut world, city) = town();
    let viewer = trader(&mut world, "Viewer", city, 1_000, 0);
    let shy = trader(&mut world, "Shy", city, 1_000, 0);
    let open = trader(&mut world, "Open", city, 1_000, 0);
    post(&mut world, Participant::Agent(viewer), IntentKind::Buy, 9, 30);
    world
        .submit_intent(Participant::Agent(shy), IntentKind::Buy, WOOL, 4, 20, 0, Anonymity::HideFromReports)
        .unwrap();
    post(&mut world, Participant::Agent(open), IntentKind::Buy, 3, 12);
    post(&mut world, Participant::Hub(city), IntentKind::Sell, 100, 15);

    let report = world.market_report(city, Some(Participant::Agent(viewer)));

    assert_eq!(report.quotes.len(), 1);
    let quote = &report.quotes[0];
    assert_eq!(quote.best_bid, Some(12));
    assert_eq!(quote.bid_depth, 3);
    assert_eq!(quote.best_ask, Some(15));
    assert_eq!(quote.ask_depth, 100);
}

#[test]
fn population_follows_hub_sales_of_flagged_goods() {
    let config = ClearingConfig::default().with_effect(GRAIN, CommodityEffect::PopulationShift);
    let mut world = World::new(config);
    let city = world.add_location("Harrowgate", LocationKind::City, None).unwrap();
    world.get_location_mut(city).unwrap().population = 50;
    let buyer = world.add_agent("Recruiter", city).unwrap();
    world.get_agent_mut(buyer).unwrap().currency = 100;
    world
        .submit_intent(Participant::Hub(city), IntentKind::Sell, GRAIN, 20, 2, 0, Anonymity::Open)
        .unwrap();
    world
        .submit_intent(Participant::Agent(buyer), IntentKind::Buy, GRAIN, 8, 2, 0, Anonymity::Open)
        .unwrap();

    world.clear_market(city);

    assert_eq!(world.get_location(city).unwrap().population, 42);
}

#[test]
fn partial_fill_carries_over_to_next_cycle() {
    let (mut world, city) = town();
    let seller = trader(&mut world, "Seller", city, 0, 3);
    let buyer = trader(&mut world, "Buyer", city, 1_000, 0);
    post(&mut world, Participant::Agent(seller), IntentKind::Sell, 10, 10);
    post(&mut world, Participant::Agent(buyer), IntentKind::Buy, 8, 10);

    let first = world.clear_all_markets();
    assert_eq!(first.volume(), 3);

    world.get_agent_mut(seller).unwrap().goods.insert(WOOL, 10);
    let second = world.clear_all_markets();

    assert_eq!(second.cycle, 1);
    assert_eq!(second.volume(), 5);
    assert_eq!(wool(&world, buyer), 8);
    assert_eq!(world.cycle, 2);
}
